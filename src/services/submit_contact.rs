use chrono::Duration;
use tonic::{Request, Response, Status};
use crate::{grpc::{api, common}, model::contact::{Contact, ContactForm, STATUS_NEW}, utils::{context::ServiceContext, errors::{AgriError, ErrorCode}, generate_id}};

pub async fn submit_contact(ctx: &ServiceContext, request: Request<api::ContactRequest>)
    -> Result<Response<common::MessageResponse>, Status> {

    let request = request.into_inner();
    let form = ContactForm::parse(&request.name, &request.email, &request.phone, &request.message)?;

    save_contact(ctx, form).await?;

    Ok(Response::new(common::MessageResponse {
        message: "Thank you for contacting us! We'll get back to you soon.".to_string()
    }))
}

///
/// Store the submission unless the same email has used the form within the rate-limit window.
///
pub async fn save_contact(ctx: &ServiceContext, form: ContactForm) -> Result<Contact, AgriError> {
    let now = ctx.now();
    let window = Duration::days(ctx.config().contact_rate_limit_days);

    if let Some(last) = ctx.contacts().latest_since(&form.email, now - window).await? {
        let days_remaining = (last.created_at + window - now).num_days() + 1;

        return Err(ErrorCode::ContactRateLimited.with_msg(&format!(
            "You've already submitted a query recently. Please wait {} more day(s) before submitting again.",
            days_remaining)))
    }

    let contact = Contact {
        contact_id: generate_id(),
        name: form.name,
        email: form.email,
        phone: form.phone,
        message: form.message,
        status: STATUS_NEW.to_string(),
        created_at: now,
    };

    ctx.contacts().insert(&contact).await?;
    tracing::info!("Contact form {} stored", contact.contact_id);

    ctx.notify("Contact emails", ctx.notifier().send_contact(&contact)).await;

    Ok(contact)
}
