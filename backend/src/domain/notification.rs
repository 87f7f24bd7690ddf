//! Transactional e-mail jobs and their rendered messages.

use super::ids::{CourseId, UserId};
use super::money::Money;
use super::user::{EmailAddress, User};

/// Work item placed on the notification queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationJob {
    /// Sent once per newly enrolled course.
    EnrollmentConfirmation {
        user: UserId,
        course: CourseId,
        course_title: String,
    },
    /// Sent when the client reports a completed payment.
    PaymentReceipt {
        user: UserId,
        order_id: String,
        payment_id: String,
        amount: Money,
    },
}

impl NotificationJob {
    /// Recipient of the job.
    pub fn user(&self) -> UserId {
        match self {
            Self::EnrollmentConfirmation { user, .. } | Self::PaymentReceipt { user, .. } => *user,
        }
    }

    /// Short label for logs.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::EnrollmentConfirmation { .. } => "enrollment_confirmation",
            Self::PaymentReceipt { .. } => "payment_receipt",
        }
    }

    /// Render the job into a message addressed to `recipient`.
    ///
    /// # Examples
    /// ```
    /// use eduquest::domain::{
    ///     CourseId, EmailAddress, NotificationJob, PersonName, User, UserDraft, UserId, UserRole,
    /// };
    ///
    /// let user = User::new(UserDraft {
    ///     id: UserId::random(),
    ///     first_name: PersonName::new("Ada", "firstName").unwrap(),
    ///     last_name: PersonName::new("Lovelace", "lastName").unwrap(),
    ///     email: EmailAddress::new("ada@example.com").unwrap(),
    ///     role: UserRole::Student,
    ///     enrolled_courses: Vec::new(),
    /// });
    /// let job = NotificationJob::EnrollmentConfirmation {
    ///     user: user.id(),
    ///     course: CourseId::random(),
    ///     course_title: "Rust".to_owned(),
    /// };
    /// assert_eq!(job.render(&user).subject, "Successfully Enrolled into Rust");
    /// ```
    pub fn render(&self, recipient: &User) -> EmailMessage {
        match self {
            Self::EnrollmentConfirmation { course_title, .. } => EmailMessage {
                to: recipient.email().clone(),
                subject: format!("Successfully Enrolled into {course_title}"),
                html_body: format!(
                    "<p>Dear {},</p><p>Congratulations, you are now enrolled in \
                     <strong>{}</strong>!</p><p>Best regards,<br>EduQuest Team</p>",
                    escape_html(&recipient.full_name()),
                    escape_html(course_title),
                ),
            },
            Self::PaymentReceipt {
                order_id,
                payment_id,
                amount,
                ..
            } => EmailMessage {
                to: recipient.email().clone(),
                subject: "Payment Received".to_owned(),
                html_body: format!(
                    "<p>Dear {},</p><p>The amount of Rs.{} has been received successfully.</p>\
                     <p>Order: {}<br>Payment: {}</p><p>Thank you for your purchase!</p>\
                     <p>Best regards,<br>EduQuest Team</p>",
                    escape_html(&recipient.full_name()),
                    amount.to_major(),
                    escape_html(order_id),
                    escape_html(payment_id),
                ),
            },
        }
    }
}

/// A rendered e-mail ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub to: EmailAddress,
    pub subject: String,
    pub html_body: String,
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::user::{PersonName, UserDraft, UserRole};
    use rstest::{fixture, rstest};

    #[fixture]
    fn recipient() -> User {
        User::new(UserDraft {
            id: UserId::random(),
            first_name: PersonName::new("Ada", "firstName").expect("name"),
            last_name: PersonName::new("<Lovelace>", "lastName").expect("name"),
            email: EmailAddress::new("ada@example.com").expect("email"),
            role: UserRole::Student,
            enrolled_courses: Vec::new(),
        })
    }

    #[rstest]
    fn payment_receipt_states_amount_in_rupees(recipient: User) {
        let job = NotificationJob::PaymentReceipt {
            user: recipient.id(),
            order_id: "order_1".to_owned(),
            payment_id: "pay_1".to_owned(),
            amount: Money::from_minor(49_950),
        };
        let message = job.render(&recipient);
        assert_eq!(message.subject, "Payment Received");
        assert_eq!(message.to.as_ref(), "ada@example.com");
        assert!(message.html_body.contains("Rs.499.50"));
        assert!(message.html_body.contains("EduQuest Team"));
    }

    #[rstest]
    fn user_supplied_text_is_escaped(recipient: User) {
        let job = NotificationJob::EnrollmentConfirmation {
            user: recipient.id(),
            course: CourseId::random(),
            course_title: "Rust & <Friends>".to_owned(),
        };
        let message = job.render(&recipient);
        assert!(message.html_body.contains("Rust &amp; &lt;Friends&gt;"));
        assert!(message.html_body.contains("Ada &lt;Lovelace&gt;"));
        assert_eq!(message.subject, "Successfully Enrolled into Rust & <Friends>");
    }
}
