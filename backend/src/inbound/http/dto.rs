//! Response payloads shared by several endpoints.
//!
//! Domain aggregates keep their fields private; these camelCase views are
//! what the API promises to clients.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::ports::{EnrolledCourse, InstructorCourse, ProgressView};
use crate::domain::{
    AuthenticatedUser, Category, Course, CourseStatus, GatewayOrder, Review, ReviewSummary,
    Section, SectionOutline, Subsection, User, UserRole,
};

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    #[schema(format = Uuid)]
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub account_type: UserRole,
}

impl From<&User> for UserDto {
    fn from(user: &User) -> Self {
        Self {
            id: user.id().to_string(),
            first_name: user.first_name().to_string(),
            last_name: user.last_name().to_string(),
            email: user.email().to_string(),
            account_type: user.role(),
        }
    }
}

/// Identity returned by login.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionUserDto {
    #[schema(format = Uuid)]
    pub id: String,
    pub account_type: UserRole,
}

impl From<AuthenticatedUser> for SessionUserDto {
    fn from(user: AuthenticatedUser) -> Self {
        Self {
            id: user.id.to_string(),
            account_type: user.role,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EnrolledCourseDto {
    #[schema(format = Uuid)]
    pub course_id: String,
    pub title: String,
    pub progress_percentage: u8,
}

impl From<&EnrolledCourse> for EnrolledCourseDto {
    fn from(course: &EnrolledCourse) -> Self {
        Self {
            course_id: course.course.to_string(),
            title: course.title.clone(),
            progress_percentage: course.percentage,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryDto {
    #[schema(format = Uuid)]
    pub id: String,
    pub name: String,
    pub description: String,
}

impl From<&Category> for CategoryDto {
    fn from(category: &Category) -> Self {
        Self {
            id: category.id().to_string(),
            name: category.name().to_owned(),
            description: category.description().to_owned(),
        }
    }
}

/// Course card. Prices are in major units.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CourseDto {
    #[schema(format = Uuid)]
    pub id: String,
    #[schema(format = Uuid)]
    pub instructor_id: String,
    #[schema(format = Uuid)]
    pub category_id: String,
    pub title: String,
    pub description: String,
    pub what_you_will_learn: String,
    #[schema(value_type = String, example = "499.00")]
    pub price: Decimal,
    pub tags: Vec<String>,
    pub instructions: Vec<String>,
    pub status: CourseStatus,
    pub students_enrolled: usize,
    pub created_at: DateTime<Utc>,
}

impl From<&Course> for CourseDto {
    fn from(course: &Course) -> Self {
        Self {
            id: course.id().to_string(),
            instructor_id: course.instructor().to_string(),
            category_id: course.category().to_string(),
            title: course.title().to_owned(),
            description: course.description().to_owned(),
            what_you_will_learn: course.what_you_will_learn().to_owned(),
            price: course.price().to_major(),
            tags: course.tags().to_vec(),
            instructions: course.instructions().to_vec(),
            status: course.status(),
            students_enrolled: course.enrolled_count(),
            created_at: course.created_at(),
        }
    }
}

pub fn courses(courses: &[Course]) -> Vec<CourseDto> {
    courses.iter().map(CourseDto::from).collect()
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InstructorCourseDto {
    #[serde(flatten)]
    pub course: CourseDto,
    #[schema(value_type = String, example = "998.00")]
    pub income: Decimal,
}

impl From<&InstructorCourse> for InstructorCourseDto {
    fn from(entry: &InstructorCourse) -> Self {
        Self {
            course: CourseDto::from(&entry.course),
            income: entry.income.to_major(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SectionDto {
    #[schema(format = Uuid)]
    pub id: String,
    #[schema(format = Uuid)]
    pub course_id: String,
    pub name: String,
}

impl From<&Section> for SectionDto {
    fn from(section: &Section) -> Self {
        Self {
            id: section.id.to_string(),
            course_id: section.course_id.to_string(),
            name: section.name.clone(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubsectionDto {
    #[schema(format = Uuid)]
    pub id: String,
    #[schema(format = Uuid)]
    pub section_id: String,
    pub title: String,
    pub description: String,
    pub duration_secs: u32,
    pub video_url: String,
}

impl From<&Subsection> for SubsectionDto {
    fn from(subsection: &Subsection) -> Self {
        Self {
            id: subsection.id.to_string(),
            section_id: subsection.section_id.to_string(),
            title: subsection.title.clone(),
            description: subsection.description.clone(),
            duration_secs: subsection.duration_secs,
            video_url: subsection.video_url.clone(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SectionOutlineDto {
    #[serde(flatten)]
    pub section: SectionDto,
    pub subsections: Vec<SubsectionDto>,
}

impl From<&SectionOutline> for SectionOutlineDto {
    fn from(outline: &SectionOutline) -> Self {
        Self {
            section: SectionDto::from(&outline.section),
            subsections: outline.subsections.iter().map(SubsectionDto::from).collect(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReviewDto {
    #[schema(format = Uuid)]
    pub id: String,
    #[schema(format = Uuid)]
    pub user_id: String,
    #[schema(format = Uuid)]
    pub course_id: String,
    pub rating: u8,
    pub review: String,
    pub created_at: DateTime<Utc>,
}

impl From<&Review> for ReviewDto {
    fn from(review: &Review) -> Self {
        Self {
            id: review.id.to_string(),
            user_id: review.user.to_string(),
            course_id: review.course.to_string(),
            rating: review.score.value(),
            review: review.text.clone(),
            created_at: review.created_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReviewSummaryDto {
    #[serde(flatten)]
    pub review: ReviewDto,
    pub reviewer_name: String,
    pub course_title: String,
}

impl From<&ReviewSummary> for ReviewSummaryDto {
    fn from(summary: &ReviewSummary) -> Self {
        Self {
            review: ReviewDto::from(&summary.review),
            reviewer_name: summary.reviewer_name.clone(),
            course_title: summary.course_title.clone(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProgressDto {
    #[schema(format = Uuid)]
    pub course_id: String,
    pub completed_subsections: Vec<String>,
    pub total_subsections: usize,
    pub percentage: u8,
}

impl From<&ProgressView> for ProgressDto {
    fn from(view: &ProgressView) -> Self {
        Self {
            course_id: view.course.to_string(),
            completed_subsections: view.completed.iter().map(ToString::to_string).collect(),
            total_subsections: view.total_subsections,
            percentage: view.percentage,
        }
    }
}

/// Gateway order handed to the checkout widget. `amount` is in minor units.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GatewayOrderDto {
    #[schema(example = "order_Nf8s0dKq")]
    pub id: String,
    #[schema(example = 2500)]
    pub amount: i64,
    #[schema(example = "INR")]
    pub currency: String,
    pub receipt: String,
    pub status: String,
}

impl From<&GatewayOrder> for GatewayOrderDto {
    fn from(order: &GatewayOrder) -> Self {
        Self {
            id: order.id.clone(),
            amount: order.amount.minor_units(),
            currency: order.currency.to_string(),
            receipt: order.receipt.clone(),
            status: order.status.clone(),
        }
    }
}
