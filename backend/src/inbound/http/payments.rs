//! Checkout endpoints: order capture, payment verification and receipts.
//!
//! ```text
//! POST /api/v1/payments/capture       {"courses":["<uuid>", ...]}
//! POST /api/v1/payments/verify        {"razorpay_order_id":"...","razorpay_payment_id":"...",
//!                                      "razorpay_signature":"...","courses":["<uuid>"]}
//! POST /api/v1/payments/success-email {"orderId":"...","paymentId":"...","amount":2500}
//! ```
//!
//! All three are student-only. The verify endpoint answers with the
//! per-course enrollment report; a partial enrollment arrives as an
//! `enrollment_incomplete` error that still states `paymentVerified`.

use actix_web::{HttpResponse, post, web};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::ports::PaymentReceiptRequest;
use crate::domain::{
    CourseEnrollment, CourseId, CourseSelection, Error, Money, OrderValidationError,
    PaymentClaim, PaymentClaimError, UserRole,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::dto::GatewayOrderDto;
use crate::inbound::http::response::{Envelope, message_only};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, invalid_field_error, missing_field_error, parse_id_list,
};

const COURSES: FieldName = FieldName::new("courses");

#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct CaptureBody {
    #[schema(value_type = Vec<String>, format = Uuid)]
    pub courses: Vec<String>,
}

/// Completion payload forwarded from the checkout widget.
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(default)]
pub struct VerifyBody {
    pub razorpay_order_id: String,
    pub razorpay_payment_id: String,
    pub razorpay_signature: String,
    #[schema(value_type = Vec<String>, format = Uuid)]
    pub courses: Vec<String>,
}

#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptBody {
    pub order_id: String,
    pub payment_id: String,
    /// Amount paid, in minor units as returned in the captured order.
    #[schema(example = 2500)]
    pub amount: i64,
}

/// Order handed to the checkout widget.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct CaptureResponse {
    pub order: GatewayOrderDto,
    #[schema(value_type = Vec<String>)]
    pub courses: Vec<String>,
    #[schema(value_type = String, example = "25.00")]
    pub total: Decimal,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct VerifyResponse {
    pub courses: Vec<CourseEnrollment>,
}

fn course_selection(raw: &[String]) -> Result<CourseSelection, Error> {
    if raw.is_empty() {
        return Err(missing_field_error(COURSES));
    }
    let ids: Vec<CourseId> = parse_id_list(raw, COURSES)?;
    CourseSelection::new(ids).map_err(map_selection_error)
}

fn map_selection_error(err: OrderValidationError) -> Error {
    invalid_field_error(COURSES.as_str(), err.to_string())
}

fn map_claim_error(err: PaymentClaimError) -> Error {
    match err {
        PaymentClaimError::MissingField { field } => {
            missing_field_error(FieldName::new(field))
        }
    }
}

/// Price the requested courses and open a gateway order.
#[utoipa::path(
    post,
    path = "/api/v1/payments/capture",
    request_body = CaptureBody,
    responses(
        (status = 200, description = "Order created", body = CaptureResponse),
        (status = 400, description = "Invalid course selection", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Not a student", body = Error),
        (status = 404, description = "Unknown course", body = Error),
        (status = 409, description = "Already enrolled", body = Error),
        (status = 502, description = "Payment gateway failure", body = Error)
    ),
    tags = ["payments"],
    operation_id = "capturePayment"
)]
#[post("/payments/capture")]
pub async fn capture_payment(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CaptureBody>,
) -> ApiResult<HttpResponse> {
    let student = session.require_role(UserRole::Student)?;
    let selection = course_selection(&payload.courses)?;
    let intent = state.payments.create_order(&student.id, selection).await?;
    let body = CaptureResponse {
        order: GatewayOrderDto::from(&intent.order),
        courses: intent.courses.iter().map(ToString::to_string).collect(),
        total: intent.total.to_major(),
    };
    Ok(Envelope::ok("Order created successfully", body))
}

/// Verify the gateway signature and enroll the student.
#[utoipa::path(
    post,
    path = "/api/v1/payments/verify",
    request_body = VerifyBody,
    responses(
        (status = 200, description = "Payment verified, every course enrolled", body = VerifyResponse),
        (status = 400, description = "Missing field", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Signature rejected or not a student", body = Error),
        (status = 500, description = "Payment verified but enrollment incomplete", body = Error)
    ),
    tags = ["payments"],
    operation_id = "verifyPayment"
)]
#[post("/payments/verify")]
pub async fn verify_payment(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<VerifyBody>,
) -> ApiResult<HttpResponse> {
    let student = session.require_role(UserRole::Student)?;
    let body = payload.into_inner();
    let courses = course_selection(&body.courses)?;
    let claim = PaymentClaim::try_new(
        &body.razorpay_order_id,
        &body.razorpay_payment_id,
        &body.razorpay_signature,
        courses,
        student.id,
    )
    .map_err(map_claim_error)?;
    let report = state.payments.verify_payment(&claim).await?;
    Ok(Envelope::ok(
        "Payment Verified",
        VerifyResponse {
            courses: report.courses,
        },
    ))
}

/// Queue a payment receipt e-mail for the calling student.
#[utoipa::path(
    post,
    path = "/api/v1/payments/success-email",
    request_body = ReceiptBody,
    responses(
        (status = 200, description = "Receipt queued"),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Unknown user", body = Error)
    ),
    tags = ["payments"],
    operation_id = "sendPaymentReceipt"
)]
#[post("/payments/success-email")]
pub async fn send_payment_receipt(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<ReceiptBody>,
) -> ApiResult<HttpResponse> {
    let student = session.require_role(UserRole::Student)?;
    let body = payload.into_inner();
    if body.amount <= 0 {
        return Err(invalid_field_error("amount", "amount must be positive"));
    }
    let amount = Money::from_minor(body.amount);
    state
        .payments
        .send_payment_receipt(PaymentReceiptRequest {
            user: student.id,
            order_id: body.order_id,
            payment_id: body.payment_id,
            amount,
        })
        .await?;
    Ok(message_only("Payment receipt queued"))
}
