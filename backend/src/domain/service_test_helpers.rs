//! Builders shared by domain service tests.

use std::collections::BTreeSet;

use chrono::Utc;

use crate::domain::{
    CategoryId, Course, CourseDraft, CourseId, CourseStatus, EmailAddress, Money, PersonName,
    User, UserDraft, UserId, UserRole,
};

pub(crate) fn course(title: &str, price_minor: i64) -> Course {
    course_with(title, price_minor, CourseStatus::Published, BTreeSet::new())
}

pub(crate) fn course_with(
    title: &str,
    price_minor: i64,
    status: CourseStatus,
    students: BTreeSet<UserId>,
) -> Course {
    Course::new(CourseDraft {
        id: CourseId::random(),
        instructor: UserId::random(),
        category: CategoryId::random(),
        title: title.to_owned(),
        description: format!("{title} description"),
        what_you_will_learn: "Everything".to_owned(),
        price: Money::from_minor(price_minor),
        tags: Vec::new(),
        instructions: Vec::new(),
        status,
        students_enrolled: students,
        created_at: Utc::now(),
    })
    .expect("valid test course")
}

pub(crate) fn user(id: UserId, role: UserRole, courses: Vec<CourseId>) -> User {
    User::new(UserDraft {
        id,
        first_name: PersonName::new("Ada", "firstName").expect("name"),
        last_name: PersonName::new("Lovelace", "lastName").expect("name"),
        email: EmailAddress::new("ada@example.com").expect("email"),
        role,
        enrolled_courses: courses,
    })
}
