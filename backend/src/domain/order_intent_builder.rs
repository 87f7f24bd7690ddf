//! Checkout step one: price a course selection and open a gateway order.
//!
//! This step only reads the ledger. The gateway call is its sole side
//! effect, so an aborted request needs no cleanup.

use std::sync::Arc;

use serde_json::json;
use tracing::warn;

use super::port_errors::{map_course_error, map_gateway_error};
use super::ports::{CourseRepository, PaymentGateway};
use super::{
    Course, CourseSelection, Currency, Error, OrderIntent, OrderRequest, ReceiptToken, UserId,
    order_total,
};

/// Builds [`OrderIntent`]s from current course prices.
#[derive(Clone)]
pub struct OrderIntentBuilder {
    courses: Arc<dyn CourseRepository>,
    gateway: Arc<dyn PaymentGateway>,
    currency: Currency,
}

impl OrderIntentBuilder {
    /// Create a builder that prices orders in `currency`.
    pub fn new(
        courses: Arc<dyn CourseRepository>,
        gateway: Arc<dyn PaymentGateway>,
        currency: Currency,
    ) -> Self {
        Self {
            courses,
            gateway,
            currency,
        }
    }

    /// Resolve, check and price every requested course, then create the
    /// gateway order.
    ///
    /// Unknown or unpublished courses are `not_found`; a course the user
    /// already owns is a `conflict`; bad prices are `invalid_request`.
    pub async fn build(
        &self,
        user: &UserId,
        selection: CourseSelection,
    ) -> Result<OrderIntent, Error> {
        let courses = self.resolve(&selection).await?;

        if let Some(owned) = courses.iter().find(|course| course.has_student(user)) {
            return Err(Error::conflict(format!(
                "Student is already enrolled in {}",
                owned.title()
            ))
            .with_details(json!({ "courseId": owned.id() })));
        }

        let total =
            order_total(&courses).map_err(|err| Error::invalid_request(err.to_string()))?;
        let receipt = ReceiptToken::generate();
        let request = OrderRequest {
            amount: total,
            currency: self.currency.clone(),
            receipt,
            course_digest: selection.digest(),
        };
        let order = self.gateway.create_order(&request).await.map_err(|err| {
            warn!(user_id = %user, receipt = %receipt, error = %err, "gateway order creation failed");
            map_gateway_error(&err)
        })?;

        Ok(OrderIntent {
            user: *user,
            courses: selection.into_vec(),
            total,
            receipt,
            order,
        })
    }

    /// Load the selection in request order, failing on any missing course.
    async fn resolve(&self, selection: &CourseSelection) -> Result<Vec<Course>, Error> {
        let mut found = self
            .courses
            .find_many(selection.as_slice())
            .await
            .map_err(map_course_error)?;

        let mut ordered = Vec::with_capacity(selection.as_slice().len());
        let mut missing = Vec::new();
        for id in selection.as_slice() {
            match found.iter().position(|course| course.id() == *id) {
                Some(index) if found.get(index).is_some_and(Course::is_published) => {
                    ordered.push(found.swap_remove(index));
                }
                _ => missing.push(*id),
            }
        }
        if !missing.is_empty() {
            return Err(Error::not_found("Could not find the course")
                .with_details(json!({ "courseIds": missing })));
        }
        Ok(ordered)
    }
}

#[cfg(test)]
#[path = "order_intent_builder_tests.rs"]
mod tests;
