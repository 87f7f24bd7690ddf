//! Order intents and the values exchanged with the payment gateway.
//!
//! An [`OrderIntent`] lives for one request only: it is computed from the
//! current course prices, sent to the gateway, and returned to the client.
//! Nothing here is persisted.

use std::collections::BTreeSet;
use std::fmt;

use sha2::{Digest, Sha256};
use uuid::Uuid;

use super::catalogue::Course;
use super::ids::{CourseId, UserId};
use super::money::{Currency, Money};

/// Validation failures raised while building an order.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OrderValidationError {
    #[error("courses must not be empty")]
    EmptyCourses,
    #[error("course {0} is listed more than once")]
    DuplicateCourse(CourseId),
    #[error("course {0} does not have a valid price")]
    NonPositivePrice(CourseId),
    #[error("order total must be greater than zero")]
    NonPositiveTotal,
    #[error("order total is out of range")]
    TotalOverflow,
}

/// A non-empty, duplicate-free list of requested courses, in request order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseSelection(Vec<CourseId>);

impl CourseSelection {
    /// Validate a requested course list.
    ///
    /// # Examples
    /// ```
    /// use eduquest::domain::{CourseId, CourseSelection, OrderValidationError};
    ///
    /// let id = CourseId::random();
    /// assert_eq!(
    ///     CourseSelection::new(vec![id, id]),
    ///     Err(OrderValidationError::DuplicateCourse(id))
    /// );
    /// ```
    pub fn new(courses: Vec<CourseId>) -> Result<Self, OrderValidationError> {
        if courses.is_empty() {
            return Err(OrderValidationError::EmptyCourses);
        }
        for (index, course) in courses.iter().enumerate() {
            if courses.iter().take(index).any(|earlier| earlier == course) {
                return Err(OrderValidationError::DuplicateCourse(*course));
            }
        }
        Ok(Self(courses))
    }

    pub fn as_slice(&self) -> &[CourseId] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<CourseId> {
        self.0
    }

    /// Hex SHA-256 over the sorted ids. Request order does not matter.
    ///
    /// Written into the gateway order notes at checkout so a paid order can
    /// later be matched against the courses a claim asks for.
    pub fn digest(&self) -> String {
        let sorted: BTreeSet<&CourseId> = self.0.iter().collect();
        let mut hasher = Sha256::new();
        for (index, course) in sorted.into_iter().enumerate() {
            if index > 0 {
                hasher.update(b",");
            }
            hasher.update(course.to_string().as_bytes());
        }
        hex::encode(hasher.finalize())
    }
}

/// Sum the prices of `courses`.
///
/// Every price must be positive and the sum must not overflow.
pub fn order_total(courses: &[Course]) -> Result<Money, OrderValidationError> {
    let mut total = Money::ZERO;
    for course in courses {
        if !course.price().is_positive() {
            return Err(OrderValidationError::NonPositivePrice(course.id()));
        }
        total = total
            .checked_add(course.price())
            .ok_or(OrderValidationError::TotalOverflow)?;
    }
    if !total.is_positive() {
        return Err(OrderValidationError::NonPositiveTotal);
    }
    Ok(total)
}

/// Unique receipt correlating an order with the gateway (UUIDv4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReceiptToken(Uuid);

impl ReceiptToken {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl fmt::Display for ReceiptToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Order creation request sent to the payment gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderRequest {
    pub amount: Money,
    pub currency: Currency,
    pub receipt: ReceiptToken,
    /// [`CourseSelection::digest`] of the priced courses.
    pub course_digest: String,
}

/// Order as acknowledged by the payment gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayOrder {
    pub id: String,
    pub amount: Money,
    pub currency: Currency,
    pub receipt: String,
    pub status: String,
    /// Course digest read back from the order notes, if any.
    pub course_digest: Option<String>,
}

impl GatewayOrder {
    /// Whether this order was opened for exactly `selection`.
    pub fn covers(&self, selection: &CourseSelection) -> bool {
        self.course_digest.as_deref() == Some(selection.digest().as_str())
    }
}

/// The order returned to the client for one checkout attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderIntent {
    pub user: UserId,
    pub courses: Vec<CourseId>,
    pub total: Money,
    pub receipt: ReceiptToken,
    pub order: GatewayOrder,
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use chrono::Utc;
    use rstest::rstest;

    use super::*;
    use crate::domain::catalogue::{CourseDraft, CourseStatus};
    use crate::domain::ids::CategoryId;

    fn priced(minor: i64) -> Course {
        Course::new(CourseDraft {
            id: CourseId::random(),
            instructor: UserId::random(),
            category: CategoryId::random(),
            title: "Course".to_owned(),
            description: "Description".to_owned(),
            what_you_will_learn: "Things".to_owned(),
            price: Money::from_minor(minor),
            tags: Vec::new(),
            instructions: Vec::new(),
            status: CourseStatus::Published,
            students_enrolled: BTreeSet::new(),
            created_at: Utc::now(),
        })
        .expect("valid course")
    }

    #[rstest]
    fn digest_ignores_request_order() {
        let (a, b) = (CourseId::random(), CourseId::random());
        let forward = CourseSelection::new(vec![a, b]).expect("selection");
        let reverse = CourseSelection::new(vec![b, a]).expect("selection");
        let single = CourseSelection::new(vec![a]).expect("selection");

        assert_eq!(forward.digest(), reverse.digest());
        assert_ne!(forward.digest(), single.digest());
        assert_eq!(forward.digest().len(), 64);
    }

    #[rstest]
    fn orders_cover_only_their_own_selection() {
        let (a, b) = (CourseId::random(), CourseId::random());
        let paid = CourseSelection::new(vec![a]).expect("selection");
        let order = GatewayOrder {
            id: "order_1".to_owned(),
            amount: Money::from_minor(1_000),
            currency: Currency::inr(),
            receipt: "r".to_owned(),
            status: "paid".to_owned(),
            course_digest: Some(paid.digest()),
        };

        assert!(order.covers(&paid));
        assert!(!order.covers(&CourseSelection::new(vec![a, b]).expect("selection")));
        assert!(
            !GatewayOrder {
                course_digest: None,
                ..order
            }
            .covers(&paid)
        );
    }

    #[rstest]
    fn selection_rejects_empty_lists() {
        assert_eq!(
            CourseSelection::new(Vec::new()),
            Err(OrderValidationError::EmptyCourses)
        );
    }

    #[rstest]
    fn total_sums_current_prices() {
        let courses = [priced(1_000), priced(1_500)];
        assert_eq!(order_total(&courses), Ok(Money::from_minor(2_500)));
    }

    #[rstest]
    #[case(0)]
    #[case(-100)]
    fn total_rejects_non_positive_prices(#[case] minor: i64) {
        let bad = priced(minor);
        let id = bad.id();
        assert_eq!(
            order_total(&[priced(1_000), bad]),
            Err(OrderValidationError::NonPositivePrice(id))
        );
    }

    #[rstest]
    fn total_reports_overflow() {
        let courses = [priced(i64::MAX), priced(1)];
        assert_eq!(
            order_total(&courses),
            Err(OrderValidationError::TotalOverflow)
        );
    }

    #[rstest]
    fn total_of_nothing_is_rejected() {
        assert_eq!(order_total(&[]), Err(OrderValidationError::NonPositiveTotal));
    }

    #[rstest]
    fn receipts_are_unique() {
        assert_ne!(ReceiptToken::generate(), ReceiptToken::generate());
    }
}
