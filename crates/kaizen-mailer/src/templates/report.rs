use kaizen_core::message::{OutgoingEmail, ReportContent};
use kaizen_core::model::ReportPeriod;

use super::link_base;

/// Headline mood derived from the completion rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportMood {
    pub emoji: &'static str,
    pub status: &'static str,
}

pub fn report_mood(completion_rate: i64) -> ReportMood {
    if completion_rate >= 70 {
        ReportMood {
            emoji: "🌸",
            status: "Flourishing!",
        }
    } else if completion_rate >= 40 {
        ReportMood {
            emoji: "🌿",
            status: "Growing Strong",
        }
    } else {
        ReportMood {
            emoji: "🌱",
            status: "Just Starting",
        }
    }
}

fn period_label(period: ReportPeriod) -> &'static str {
    match period {
        ReportPeriod::Weekly => "This Week",
        ReportPeriod::Monthly => "This Month",
    }
}

/// Whole hours, rounding half up.
fn focused_hours(minutes: i64) -> i64 {
    (minutes.max(0) + 30) / 60
}

fn interruptions_block(count: i64) -> String {
    if count <= 0 {
        return String::new();
    }
    let plural = if count > 1 { "s" } else { "" };
    format!(
        r#"<div style="background: #fff5f5; border-left: 4px solid hsl(340, 75%, 65%); padding: 16px; border-radius: 8px; margin-bottom: 24px;">
      <p style="margin: 0; color: #2d3748;">🛑 <strong>{count} session{plural}</strong> stopped early</p>
      <p style="margin: 8px 0 0 0; color: #718096; font-size: 13px;">Try the 2-minute rule: if you feel like stopping, just do 2 more minutes.</p>
    </div>"#
    )
}

/// Render the weekly or monthly report card.
pub fn render_report(content: &ReportContent, from: &str, app_url: &str) -> OutgoingEmail {
    let mood = report_mood(content.completion_rate);
    let subject = format!(
        "{} Your {} Report Card is Ready!",
        mood.emoji,
        content.period.title()
    );

    let html = format!(
        r#"<div style="font-family: system-ui, -apple-system, sans-serif; max-width: 600px; margin: 0 auto; padding: 20px; background: #f8fafc;">
  <div style="background: linear-gradient(135deg, hsl(165, 60%, 50%) 0%, hsl(200, 50%, 70%) 100%); padding: 40px 30px; border-radius: 16px 16px 0 0; text-align: center;">
    <div style="font-size: 48px; margin-bottom: 10px;">{emoji}</div>
    <h1 style="color: white; margin: 0; font-size: 28px;">{status}</h1>
    <p style="color: rgba(255,255,255,0.9); margin: 10px 0 0 0; font-size: 16px;">{label}'s Growth Report</p>
  </div>
  <div style="background: white; padding: 40px; border-radius: 0 0 16px 16px; box-shadow: 0 4px 12px rgba(0,0,0,0.08);">
    <div style="text-align: center; margin-bottom: 30px;">
      <div style="font-size: 28px; font-weight: bold; color: hsl(165, 60%, 45%);">{rate}%</div>
      <p style="color: #718096; margin-top: 10px; font-size: 14px;">Completion Rate</p>
    </div>
    <div style="display: grid; grid-template-columns: 1fr 1fr; gap: 16px; margin-bottom: 30px;">
      <div style="background: #f0fdf4; padding: 20px; border-radius: 12px; text-align: center;">
        <div style="font-size: 24px; font-weight: bold; color: hsl(165, 60%, 45%);">{completed}</div>
        <div style="color: #718096; font-size: 12px; margin-top: 4px;">Tasks Done</div>
      </div>
      <div style="background: #f0f9ff; padding: 20px; border-radius: 12px; text-align: center;">
        <div style="font-size: 24px; font-weight: bold; color: hsl(200, 50%, 50%);">{hours}h</div>
        <div style="color: #718096; font-size: 12px; margin-top: 4px;">Focused Time</div>
      </div>
    </div>
    <div style="background: #fafafa; padding: 20px; border-radius: 12px; margin-bottom: 24px;">
      <h3 style="margin: 0 0 15px 0; color: #2d3748; font-size: 16px;">⭐ XP Balance</h3>
      <div style="display: flex; justify-content: space-around;">
        <div style="text-align: center;">
          <div style="font-size: 20px; font-weight: bold; color: hsl(165, 60%, 45%);">+{earned}</div>
          <div style="color: #718096; font-size: 12px;">Earned</div>
        </div>
        <div style="text-align: center;">
          <div style="font-size: 20px; font-weight: bold; color: #e53e3e;">-{missed}</div>
          <div style="color: #718096; font-size: 12px;">Missed</div>
        </div>
      </div>
    </div>
    {interruptions}
    <div style="background: linear-gradient(135deg, hsl(165, 50%, 95%) 0%, hsl(210, 50%, 95%) 100%); padding: 20px; border-radius: 12px; margin-bottom: 30px;">
      <h3 style="margin: 0 0 10px 0; color: #2d3748; font-size: 16px;">💡 Your Insight</h3>
      <p style="margin: 0; color: #4a5568; line-height: 1.6;">{insight}</p>
    </div>
    <div style="text-align: center;">
      <a href="{link}/report" style="background: linear-gradient(135deg, hsl(165, 60%, 50%) 0%, hsl(200, 50%, 60%) 100%); color: white; padding: 16px 40px; text-decoration: none; border-radius: 12px; font-weight: 600; display: inline-block;">View Full Report Card →</a>
    </div>
  </div>
  <div style="text-align: center; margin-top: 24px; color: #a0aec0; font-size: 12px;">
    <p>You're receiving this {kind} report because you enabled it in your notification settings.</p>
    <p style="margin-top: 8px;">Keep growing! 🌱</p>
  </div>
</div>"#,
        emoji = mood.emoji,
        status = mood.status,
        label = period_label(content.period),
        rate = content.completion_rate,
        completed = content.completed_tasks,
        hours = focused_hours(content.focus_minutes),
        earned = content.xp_earned,
        missed = content.xp_missed,
        interruptions = interruptions_block(content.interrupted_sessions),
        insight = content.top_insight,
        link = link_base(app_url),
        kind = content.period,
    );

    OutgoingEmail {
        from: from.to_string(),
        to: vec![content.recipient.clone()],
        subject,
        html,
    }
}
