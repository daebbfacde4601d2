use kaizen_core::message::{OutgoingEmail, ReminderContent};

use super::link_base;

pub const REMINDER_SUBJECT: &str = "⏰ Task Reminder: Don't forget your goal!";

/// Render the overdue-task nudge.
pub fn render_reminder(content: &ReminderContent, from: &str, app_url: &str) -> OutgoingEmail {
    let description = content
        .description
        .as_deref()
        .map(|d| format!(r#"<p style="color: #4a5568; margin: 0 0 15px 0;">{d}</p>"#))
        .unwrap_or_default();

    let html = format!(
        r#"<div style="font-family: system-ui, -apple-system, sans-serif; max-width: 600px; margin: 0 auto; padding: 20px;">
  <div style="background: linear-gradient(135deg, #667eea 0%, #764ba2 100%); padding: 30px; border-radius: 12px 12px 0 0; text-align: center;">
    <h1 style="color: white; margin: 0; font-size: 28px;">🌱 Kaizen Focus</h1>
    <p style="color: rgba(255,255,255,0.9); margin: 10px 0 0 0;">Your Growth Journey Awaits</p>
  </div>
  <div style="background: white; padding: 40px; border-radius: 0 0 12px 12px; box-shadow: 0 4px 6px rgba(0,0,0,0.1);">
    <h2 style="color: #2d3748; margin-top: 0;">⏰ Friendly Reminder</h2>
    <p style="color: #4a5568; line-height: 1.6;">Hey there! It looks like you haven't completed your task yet. Remember, every small step counts towards your growth!</p>
    <div style="background: #f7fafc; border-left: 4px solid #667eea; padding: 20px; margin: 25px 0; border-radius: 4px;">
      <h3 style="color: #2d3748; margin: 0 0 10px 0; font-size: 20px;">{title}</h3>
      {description}
      <div style="display: flex; gap: 15px; flex-wrap: wrap;">
        <span style="background: #667eea; color: white; padding: 8px 16px; border-radius: 20px; font-size: 14px; font-weight: 600;">⭐ {xp} XP</span>
        <span style="background: #48bb78; color: white; padding: 8px 16px; border-radius: 20px; font-size: 14px; font-weight: 600;">⏱️ {minutes} minutes</span>
      </div>
    </div>
    <p style="color: #4a5568; line-height: 1.6;">
      <strong>Why complete this task?</strong><br>
      • Earn {xp} XP towards your growth<br>
      • Maintain your momentum and build consistency<br>
      • Feel the satisfaction of accomplishment
    </p>
    <div style="text-align: center; margin-top: 30px;">
      <a href="{link}" style="background: #667eea; color: white; padding: 14px 32px; text-decoration: none; border-radius: 8px; font-weight: 600; display: inline-block;">Start Your Task Now →</a>
    </div>
    <p style="color: #718096; font-size: 14px; margin-top: 30px; padding-top: 20px; border-top: 1px solid #e2e8f0;">💡 <strong>Pro tip:</strong> Breaking tasks into smaller chunks makes them easier to complete. You got this!</p>
  </div>
  <div style="text-align: center; margin-top: 20px; color: #a0aec0; font-size: 12px;">
    <p>You're receiving this because you enabled task notifications in Kaizen Focus.</p>
  </div>
</div>"#,
        title = content.title,
        description = description,
        xp = content.xp,
        minutes = content.minutes,
        link = link_base(app_url),
    );

    OutgoingEmail {
        from: from.to_string(),
        to: vec![content.recipient.clone()],
        subject: REMINDER_SUBJECT.to_string(),
        html,
    }
}
