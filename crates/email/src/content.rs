//! Shared email content templates
//!
//! Canonical content generators for feedback emails, used by both
//! production (SES) and mock email services.

/// Generate plain-text body for a feedback email.
pub fn feedback_text(identity: &str, feedback: &str) -> String {
    format!(
        "Feedback from user: {}\n\n\
        {}\n\n\
        --\n\
        Sent by the Appmint feedback relay",
        identity, feedback
    )
}

/// Generate styled HTML body for a feedback email.
pub fn feedback_html(identity: &str, feedback: &str) -> String {
    format!(
        r#"
            <html>
            <body style="font-family: Arial, sans-serif; line-height: 1.6; color: #333;">
                <div style="max-width: 600px; margin: 0 auto; padding: 20px;">
                    <h2 style="color: #007cba;">New feedback</h2>

                    <p>From user: <strong>{identity}</strong></p>

                    <p style="background-color: #f5f5f5; padding: 10px; border-radius: 4px; white-space: pre-wrap;">{feedback}</p>

                    <hr style="border: none; border-top: 1px solid #eee; margin: 30px 0;">

                    <p style="color: #666; font-size: 12px;">
                        Sent by the Appmint feedback relay
                    </p>
                </div>
            </body>
            </html>
            "#,
        identity = identity,
        feedback = feedback
    )
}
