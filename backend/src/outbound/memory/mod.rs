//! In-memory implementation of every repository port.
//!
//! All tables sit behind one async mutex, so each port call, and in
//! particular each [`EnrollmentLedger::enroll`], observes and mutates a
//! consistent snapshot. Used when no database is configured and in tests.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::ports::{
    AccountRemoval, CategoryRepository, CategoryRepositoryError, CompletionOutcome,
    CourseRemoval, CourseRepository, CourseRepositoryError, EnrollOutcome, EnrollmentLedger,
    EnrollmentLedgerError, NewUserRecord, ProfileRecord, ProgressRepository,
    ProgressRepositoryError, RatingRepository, RatingRepositoryError, UserCredentials,
    UserPersistenceError, UserRepository,
};
use crate::domain::{
    Category, CategoryId, Course, CourseDraft, CourseFilter, CourseId, CourseOutline,
    CourseProgress, CourseStatus, EmailAddress, Review, ReviewSummary, Section, SectionId,
    SectionOutline, Subsection, SubsectionId, User, UserDraft, UserId,
};

#[derive(Default)]
struct Tables {
    users: Vec<NewUserRecord>,
    categories: Vec<Category>,
    courses: Vec<CourseDraft>,
    /// (course, user) in enrollment order.
    enrollments: Vec<(CourseId, UserId)>,
    sections: Vec<Section>,
    subsections: Vec<Subsection>,
    progress: Vec<CourseProgress>,
    ratings: Vec<Review>,
}

impl Tables {
    fn user(&self, record: &NewUserRecord) -> User {
        let enrolled_courses = self
            .enrollments
            .iter()
            .filter(|(_, user)| *user == record.id)
            .map(|(course, _)| *course)
            .collect();
        User::new(UserDraft {
            id: record.id,
            first_name: record.first_name.clone(),
            last_name: record.last_name.clone(),
            email: record.email.clone(),
            role: record.role,
            enrolled_courses,
        })
    }

    fn course(&self, draft: &CourseDraft) -> Result<Course, String> {
        let mut draft = draft.clone();
        draft.students_enrolled = self
            .enrollments
            .iter()
            .filter(|(course, _)| *course == draft.id)
            .map(|(_, user)| *user)
            .collect();
        Course::new(draft).map_err(|err| format!("stored course is invalid: {err}"))
    }

    fn progress_mut(&mut self, course: &CourseId, user: &UserId) -> Option<&mut CourseProgress> {
        self.progress
            .iter_mut()
            .find(|p| p.course == *course && p.user == *user)
    }

    /// Drop subsections matching `doomed` and every completion mark on them.
    fn remove_subsections(&mut self, doomed: impl Fn(&Subsection) -> bool) -> usize {
        let removed: Vec<SubsectionId> = self
            .subsections
            .iter()
            .filter(|sub| doomed(sub))
            .map(|sub| sub.id)
            .collect();
        self.subsections.retain(|sub| !removed.contains(&sub.id));
        for progress in &mut self.progress {
            progress.completed.retain(|id| !removed.contains(id));
        }
        removed.len()
    }
}

fn course_draft(course: &Course) -> CourseDraft {
    CourseDraft {
        id: course.id(),
        instructor: course.instructor(),
        category: course.category(),
        title: course.title().to_owned(),
        description: course.description().to_owned(),
        what_you_will_learn: course.what_you_will_learn().to_owned(),
        price: course.price(),
        tags: course.tags().to_vec(),
        instructions: course.instructions().to_vec(),
        status: course.status(),
        students_enrolled: Default::default(),
        created_at: course.created_at(),
    }
}

/// Shared in-memory store. Cloning shares the tables.
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create(&self, record: &NewUserRecord) -> Result<User, UserPersistenceError> {
        let mut tables = self.tables.lock().await;
        if tables.users.iter().any(|u| u.email == record.email) {
            return Err(UserPersistenceError::duplicate_email(record.email.as_ref()));
        }
        tables.users.push(record.clone());
        Ok(tables.user(record))
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .users
            .iter()
            .find(|u| u.id == *id)
            .map(|record| tables.user(record)))
    }

    async fn find_credentials(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<UserCredentials>, UserPersistenceError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .users
            .iter()
            .find(|u| u.email == *email)
            .map(|record| UserCredentials {
                user: tables.user(record),
                password_hash: record.password_hash.clone(),
            }))
    }

    async fn update_profile(
        &self,
        id: &UserId,
        profile: &ProfileRecord,
    ) -> Result<bool, UserPersistenceError> {
        let mut tables = self.tables.lock().await;
        if tables
            .users
            .iter()
            .any(|u| u.id != *id && u.email == profile.email)
        {
            return Err(UserPersistenceError::duplicate_email(profile.email.as_ref()));
        }
        let Some(record) = tables.users.iter_mut().find(|u| u.id == *id) else {
            return Ok(false);
        };
        record.first_name = profile.first_name.clone();
        record.last_name = profile.last_name.clone();
        record.email = profile.email.clone();
        Ok(true)
    }

    async fn delete(&self, id: &UserId) -> Result<AccountRemoval, UserPersistenceError> {
        let mut tables = self.tables.lock().await;
        if !tables.users.iter().any(|u| u.id == *id) {
            return Ok(AccountRemoval::NotFound);
        }
        if tables.courses.iter().any(|c| c.instructor == *id) {
            return Ok(AccountRemoval::OwnsCourses);
        }
        tables.users.retain(|u| u.id != *id);
        tables.enrollments.retain(|(_, user)| user != id);
        tables.progress.retain(|p| p.user != *id);
        tables.ratings.retain(|r| r.user != *id);
        Ok(AccountRemoval::Removed)
    }
}

#[async_trait]
impl CategoryRepository for MemoryStore {
    async fn create(&self, category: &Category) -> Result<(), CategoryRepositoryError> {
        let mut tables = self.tables.lock().await;
        if tables.categories.iter().any(|c| c.name() == category.name()) {
            return Err(CategoryRepositoryError::duplicate_name(category.name()));
        }
        tables.categories.push(category.clone());
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Category>, CategoryRepositoryError> {
        let mut categories = self.tables.lock().await.categories.clone();
        categories.sort_by(|a, b| a.name().cmp(b.name()));
        Ok(categories)
    }

    async fn find_by_id(
        &self,
        id: &CategoryId,
    ) -> Result<Option<Category>, CategoryRepositoryError> {
        let tables = self.tables.lock().await;
        Ok(tables.categories.iter().find(|c| c.id() == *id).cloned())
    }
}

#[async_trait]
impl CourseRepository for MemoryStore {
    async fn create(&self, course: &Course) -> Result<(), CourseRepositoryError> {
        let mut tables = self.tables.lock().await;
        if tables.courses.iter().any(|c| c.id == course.id()) {
            return Err(CourseRepositoryError::query("course already exists"));
        }
        tables.courses.push(course_draft(course));
        Ok(())
    }

    async fn find_by_id(&self, id: &CourseId) -> Result<Option<Course>, CourseRepositoryError> {
        let tables = self.tables.lock().await;
        tables
            .courses
            .iter()
            .find(|c| c.id == *id)
            .map(|draft| tables.course(draft).map_err(CourseRepositoryError::query))
            .transpose()
    }

    async fn find_many(&self, ids: &[CourseId]) -> Result<Vec<Course>, CourseRepositoryError> {
        let tables = self.tables.lock().await;
        ids.iter()
            .filter_map(|id| tables.courses.iter().find(|c| c.id == *id))
            .map(|draft| tables.course(draft).map_err(CourseRepositoryError::query))
            .collect()
    }

    async fn list(&self, filter: &CourseFilter) -> Result<Vec<Course>, CourseRepositoryError> {
        let tables = self.tables.lock().await;
        let mut courses = tables
            .courses
            .iter()
            .map(|draft| tables.course(draft).map_err(CourseRepositoryError::query))
            .collect::<Result<Vec<_>, _>>()?;
        courses.retain(|course| filter.matches(course));
        courses.sort_by_key(|course| std::cmp::Reverse(course.created_at()));
        Ok(courses)
    }

    async fn set_status(
        &self,
        id: &CourseId,
        status: CourseStatus,
    ) -> Result<bool, CourseRepositoryError> {
        let mut tables = self.tables.lock().await;
        Ok(match tables.courses.iter_mut().find(|c| c.id == *id) {
            Some(draft) => {
                draft.status = status;
                true
            }
            None => false,
        })
    }

    async fn update(&self, course: &Course) -> Result<bool, CourseRepositoryError> {
        let mut tables = self.tables.lock().await;
        let Some(stored) = tables.courses.iter_mut().find(|c| c.id == course.id()) else {
            return Ok(false);
        };
        let status = stored.status;
        *stored = course_draft(course);
        stored.status = status;
        Ok(true)
    }

    async fn delete(&self, id: &CourseId) -> Result<CourseRemoval, CourseRepositoryError> {
        let mut tables = self.tables.lock().await;
        if !tables.courses.iter().any(|c| c.id == *id) {
            return Ok(CourseRemoval::NotFound);
        }
        if tables.enrollments.iter().any(|(course, _)| course == id) {
            return Ok(CourseRemoval::HasStudents);
        }
        let sections: Vec<SectionId> = tables
            .sections
            .iter()
            .filter(|s| s.course_id == *id)
            .map(|s| s.id)
            .collect();
        tables.remove_subsections(|sub| sections.contains(&sub.section_id));
        tables.sections.retain(|s| s.course_id != *id);
        tables.ratings.retain(|r| r.course != *id);
        tables.courses.retain(|c| c.id != *id);
        Ok(CourseRemoval::Removed)
    }

    async fn add_section(&self, section: &Section) -> Result<(), CourseRepositoryError> {
        let mut tables = self.tables.lock().await;
        if !tables.courses.iter().any(|c| c.id == section.course_id) {
            return Err(CourseRepositoryError::query("section references a missing course"));
        }
        tables.sections.push(section.clone());
        Ok(())
    }

    async fn add_subsection(&self, subsection: &Subsection) -> Result<(), CourseRepositoryError> {
        let mut tables = self.tables.lock().await;
        if !tables.sections.iter().any(|s| s.id == subsection.section_id) {
            return Err(CourseRepositoryError::query(
                "subsection references a missing section",
            ));
        }
        tables.subsections.push(subsection.clone());
        Ok(())
    }

    async fn update_section(&self, section: &Section) -> Result<bool, CourseRepositoryError> {
        let mut tables = self.tables.lock().await;
        Ok(match tables.sections.iter_mut().find(|s| s.id == section.id) {
            Some(stored) => {
                stored.name = section.name.clone();
                true
            }
            None => false,
        })
    }

    async fn delete_section(&self, id: &SectionId) -> Result<bool, CourseRepositoryError> {
        let mut tables = self.tables.lock().await;
        if !tables.sections.iter().any(|s| s.id == *id) {
            return Ok(false);
        }
        tables.remove_subsections(|sub| sub.section_id == *id);
        tables.sections.retain(|s| s.id != *id);
        Ok(true)
    }

    async fn find_section(&self, id: &SectionId) -> Result<Option<Section>, CourseRepositoryError> {
        let tables = self.tables.lock().await;
        Ok(tables.sections.iter().find(|s| s.id == *id).cloned())
    }

    async fn find_subsection(
        &self,
        id: &SubsectionId,
    ) -> Result<Option<Subsection>, CourseRepositoryError> {
        let tables = self.tables.lock().await;
        Ok(tables.subsections.iter().find(|sub| sub.id == *id).cloned())
    }

    async fn update_subsection(
        &self,
        subsection: &Subsection,
    ) -> Result<bool, CourseRepositoryError> {
        let mut tables = self.tables.lock().await;
        Ok(
            match tables.subsections.iter_mut().find(|sub| sub.id == subsection.id) {
                Some(stored) => {
                    *stored = Subsection {
                        section_id: stored.section_id,
                        ..subsection.clone()
                    };
                    true
                }
                None => false,
            },
        )
    }

    async fn delete_subsection(&self, id: &SubsectionId) -> Result<bool, CourseRepositoryError> {
        let mut tables = self.tables.lock().await;
        Ok(tables.remove_subsections(|sub| sub.id == *id) > 0)
    }

    async fn outline(&self, id: &CourseId) -> Result<CourseOutline, CourseRepositoryError> {
        let tables = self.tables.lock().await;
        let sections = tables
            .sections
            .iter()
            .filter(|s| s.course_id == *id)
            .map(|section| SectionOutline {
                section: section.clone(),
                subsections: tables
                    .subsections
                    .iter()
                    .filter(|sub| sub.section_id == section.id)
                    .cloned()
                    .collect(),
            })
            .collect();
        Ok(CourseOutline { sections })
    }

    async fn course_for_subsection(
        &self,
        subsection: &SubsectionId,
    ) -> Result<Option<CourseId>, CourseRepositoryError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .subsections
            .iter()
            .find(|sub| sub.id == *subsection)
            .and_then(|sub| tables.sections.iter().find(|s| s.id == sub.section_id))
            .map(|section| section.course_id))
    }
}

#[async_trait]
impl EnrollmentLedger for MemoryStore {
    async fn enroll(
        &self,
        course: &CourseId,
        user: &UserId,
    ) -> Result<EnrollOutcome, EnrollmentLedgerError> {
        let mut tables = self.tables.lock().await;
        let Some(course_title) = tables
            .courses
            .iter()
            .find(|c| c.id == *course)
            .map(|c| c.title.clone())
        else {
            return Ok(EnrollOutcome::CourseNotFound);
        };
        if !tables.users.iter().any(|u| u.id == *user) {
            return Ok(EnrollOutcome::UserNotFound);
        }
        if tables.enrollments.contains(&(*course, *user)) {
            return Ok(EnrollOutcome::AlreadyEnrolled);
        }
        tables.enrollments.push((*course, *user));
        if tables.progress_mut(course, user).is_none() {
            tables.progress.push(CourseProgress::empty(*course, *user));
        }
        Ok(EnrollOutcome::Enrolled { course_title })
    }
}

#[async_trait]
impl ProgressRepository for MemoryStore {
    async fn find(
        &self,
        course: &CourseId,
        user: &UserId,
    ) -> Result<Option<CourseProgress>, ProgressRepositoryError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .progress
            .iter()
            .find(|p| p.course == *course && p.user == *user)
            .cloned())
    }

    async fn list_for_user(
        &self,
        user: &UserId,
    ) -> Result<Vec<CourseProgress>, ProgressRepositoryError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .progress
            .iter()
            .filter(|p| p.user == *user)
            .cloned()
            .collect())
    }

    async fn record_completion(
        &self,
        course: &CourseId,
        user: &UserId,
        subsection: &SubsectionId,
    ) -> Result<CompletionOutcome, ProgressRepositoryError> {
        let mut tables = self.tables.lock().await;
        let Some(progress) = tables.progress_mut(course, user) else {
            return Ok(CompletionOutcome::MissingProgress);
        };
        Ok(if progress.completed.insert(*subsection) {
            CompletionOutcome::Recorded
        } else {
            CompletionOutcome::AlreadyCompleted
        })
    }
}

#[async_trait]
impl RatingRepository for MemoryStore {
    async fn create(&self, review: &Review) -> Result<(), RatingRepositoryError> {
        let mut tables = self.tables.lock().await;
        if tables
            .ratings
            .iter()
            .any(|r| r.user == review.user && r.course == review.course)
        {
            return Err(RatingRepositoryError::duplicate());
        }
        tables.ratings.push(review.clone());
        Ok(())
    }

    async fn list_for_course(&self, course: &CourseId) -> Result<Vec<Review>, RatingRepositoryError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .ratings
            .iter()
            .filter(|r| r.course == *course)
            .cloned()
            .collect())
    }

    async fn list_all(&self) -> Result<Vec<ReviewSummary>, RatingRepositoryError> {
        let tables = self.tables.lock().await;
        tables
            .ratings
            .iter()
            .map(|review| -> Result<ReviewSummary, RatingRepositoryError> {
                let reviewer = tables.users.iter().find(|u| u.id == review.user).ok_or_else(
                    || RatingRepositoryError::query(format!("rating {} has no reviewer", review.id)),
                )?;
                let course = tables.courses.iter().find(|c| c.id == review.course).ok_or_else(
                    || RatingRepositoryError::query(format!("rating {} has no course", review.id)),
                )?;
                Ok(ReviewSummary {
                    review: review.clone(),
                    reviewer_name: format!("{} {}", reviewer.first_name, reviewer.last_name),
                    course_title: course.title.clone(),
                })
            })
            .collect()
    }
}
