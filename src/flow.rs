use chrono::NaiveDate;

use crate::db::Ledger;
use crate::error::Result;
use crate::fmt;
use crate::models::Category;
use crate::settings::{is_allowed, Settings};
use crate::stats::{self, ChartPolicy, DailyPoint};

/// Renders a dense daily series into image bytes. The flow controller only
/// sees this seam, never a concrete format.
pub trait ChartRenderer {
    fn render(&self, series: &[DailyPoint]) -> Result<Vec<u8>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowState {
    Idle,
    AwaitingAmount { category: Category },
    AwaitingStartDate,
    AwaitingEndDate { start: NaiveDate },
}

/// Inbound chat event, already decoded by the transport.
#[derive(Debug, Clone)]
pub enum FlowEvent {
    Start,
    NewEntry(Category),
    Stats,
    Text(String),
    DatePicked(NaiveDate),
    Cancel,
}

#[derive(Debug)]
pub enum Reply {
    Text(String),
    Chart { bytes: Vec<u8>, caption: String },
}

const MENU: &str = "Choose an action: income, expense, stats.";
const ASK_AMOUNT: &str = "Enter the amount:";
const ASK_START: &str = "Pick the start date (YYYY-MM-DD):";
const ASK_END: &str = "Pick the end date (YYYY-MM-DD):";

/// Drives the two conversational flows (add-entry and stats) as an explicit
/// state machine. One controller per chat session; the transport feeds it
/// events and delivers the replies.
pub struct FlowController {
    ledger: Ledger,
    settings: Settings,
    policy: ChartPolicy,
    renderer: Option<Box<dyn ChartRenderer>>,
    state: FlowState,
}

impl FlowController {
    pub fn new(
        ledger: Ledger,
        settings: Settings,
        renderer: Option<Box<dyn ChartRenderer>>,
    ) -> Self {
        let policy = settings.chart_policy();
        Self {
            ledger,
            settings,
            policy,
            renderer,
            state: FlowState::Idle,
        }
    }

    pub fn state(&self) -> FlowState {
        self.state
    }

    /// Handle one inbound event. Validation problems come back as inline
    /// replies without leaving a safe state; storage errors are logged and
    /// surfaced as a generic failure, resetting the flow to idle.
    pub fn handle(&mut self, user_id: i64, event: FlowEvent) -> Vec<Reply> {
        if !is_allowed(&self.settings, user_id) {
            return vec![Reply::Text("Access denied.".to_string())];
        }
        match self.dispatch(user_id, event) {
            Ok(replies) => replies,
            Err(e) => {
                log::error!("Flow failed for user {user_id}: {e}");
                self.state = FlowState::Idle;
                vec![Reply::Text(
                    "Something went wrong, the action was not completed.".to_string(),
                )]
            }
        }
    }

    fn dispatch(&mut self, user_id: i64, event: FlowEvent) -> Result<Vec<Reply>> {
        if matches!(event, FlowEvent::Cancel) {
            self.transition(FlowState::Idle);
            return Ok(vec![text("Action cancelled."), text(MENU)]);
        }
        if matches!(event, FlowEvent::Start) {
            return Ok(vec![text(MENU)]);
        }

        match self.state {
            FlowState::Idle => self.dispatch_idle(event),
            FlowState::AwaitingAmount { category } => {
                self.dispatch_awaiting_amount(user_id, category, event)
            }
            FlowState::AwaitingStartDate => self.dispatch_awaiting_start(event),
            FlowState::AwaitingEndDate { start } => {
                self.dispatch_awaiting_end(user_id, start, event)
            }
        }
    }

    fn dispatch_idle(&mut self, event: FlowEvent) -> Result<Vec<Reply>> {
        match event {
            FlowEvent::NewEntry(category) => {
                self.transition(FlowState::AwaitingAmount { category });
                Ok(vec![text(ASK_AMOUNT)])
            }
            FlowEvent::Stats => {
                self.transition(FlowState::AwaitingStartDate);
                Ok(vec![text(ASK_START)])
            }
            _ => Ok(vec![text(MENU)]),
        }
    }

    fn dispatch_awaiting_amount(
        &mut self,
        user_id: i64,
        category: Category,
        event: FlowEvent,
    ) -> Result<Vec<Reply>> {
        let input = match event {
            FlowEvent::Text(t) => t,
            // Anything but an amount re-prompts without leaving the state.
            _ => return Ok(vec![text(ASK_AMOUNT)]),
        };
        let amount: i64 = match input.trim().parse() {
            Ok(n) if n >= 0 => n,
            _ => {
                return Ok(vec![text(
                    "The amount must be a whole non-negative number, try again.",
                )])
            }
        };
        self.ledger.append(user_id, category, amount, "")?;
        self.transition(FlowState::Idle);
        let noun = match category {
            Category::Income => "Income",
            Category::Expense => "Expense",
        };
        Ok(vec![text(format!(
            "{noun} of {} recorded.",
            fmt::amount(amount)
        ))])
    }

    fn dispatch_awaiting_start(&mut self, event: FlowEvent) -> Result<Vec<Reply>> {
        match event {
            FlowEvent::DatePicked(start) => {
                self.transition(FlowState::AwaitingEndDate { start });
                Ok(vec![text(ASK_END)])
            }
            _ => Ok(vec![text(ASK_START)]),
        }
    }

    fn dispatch_awaiting_end(
        &mut self,
        user_id: i64,
        start: NaiveDate,
        event: FlowEvent,
    ) -> Result<Vec<Reply>> {
        let end = match event {
            FlowEvent::DatePicked(end) => end,
            _ => return Ok(vec![text(ASK_END)]),
        };
        if end < start {
            self.transition(FlowState::Idle);
            return Ok(vec![text("The end date is before the start date.")]);
        }

        let summary = stats::summarize(&self.ledger, user_id, start, end)?;
        let mut replies = vec![text(fmt::summary_text(&summary))];

        if self.policy.wants_chart(start, end) {
            replies.push(self.chart_reply(user_id, start, end)?);
        }
        self.transition(FlowState::Idle);
        Ok(replies)
    }

    fn chart_reply(&self, user_id: i64, start: NaiveDate, end: NaiveDate) -> Result<Reply> {
        let sparse = self.ledger.daily_totals(user_id, start, end)?;
        if sparse.is_empty() {
            return Ok(text("No data to chart for this period."));
        }
        let Some(renderer) = &self.renderer else {
            return Ok(text("Chart rendering is not available in this build."));
        };
        let series = stats::daily_series(&self.ledger, user_id, start, end)?;
        let bytes = renderer.render(&series)?;
        Ok(Reply::Chart {
            bytes,
            caption: "Income and expenses by day".to_string(),
        })
    }

    fn transition(&mut self, next: FlowState) {
        log::debug!("Flow state {:?} -> {:?}", self.state, next);
        self.state = next;
    }
}

fn text(s: impl Into<String>) -> Reply {
    Reply::Text(s.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::tests::{insert_at, test_ledger};
    use crate::error::TallyError;

    struct FakeRenderer;

    impl ChartRenderer for FakeRenderer {
        fn render(&self, series: &[DailyPoint]) -> Result<Vec<u8>> {
            if series.is_empty() {
                return Err(TallyError::Chart("empty series".to_string()));
            }
            Ok(b"fake-chart".to_vec())
        }
    }

    fn controller() -> (tempfile::TempDir, FlowController) {
        let (dir, ledger) = test_ledger();
        let settings = Settings {
            allowed_user_id: 1,
            ..Settings::default()
        };
        let flow = FlowController::new(ledger, settings, Some(Box::new(FakeRenderer)));
        (dir, flow)
    }

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn text_of(reply: &Reply) -> &str {
        match reply {
            Reply::Text(t) => t,
            Reply::Chart { .. } => panic!("expected text reply"),
        }
    }

    #[test]
    fn test_rejects_unknown_user() {
        let (_dir, mut flow) = controller();
        let replies = flow.handle(999, FlowEvent::Start);
        assert_eq!(text_of(&replies[0]), "Access denied.");
        assert_eq!(flow.state(), FlowState::Idle);
    }

    #[test]
    fn test_add_entry_happy_path() {
        let (_dir, mut flow) = controller();
        let replies = flow.handle(1, FlowEvent::NewEntry(Category::Income));
        assert_eq!(text_of(&replies[0]), ASK_AMOUNT);
        assert_eq!(
            flow.state(),
            FlowState::AwaitingAmount { category: Category::Income }
        );

        let replies = flow.handle(1, FlowEvent::Text("1500".to_string()));
        assert_eq!(text_of(&replies[0]), "Income of 1,500 recorded.");
        assert_eq!(flow.state(), FlowState::Idle);
    }

    #[test]
    fn test_non_numeric_amount_reprompts_in_place() {
        let (_dir, mut flow) = controller();
        flow.handle(1, FlowEvent::NewEntry(Category::Expense));
        for bad in ["abc", "12.5", "-3", ""] {
            let replies = flow.handle(1, FlowEvent::Text(bad.to_string()));
            assert!(text_of(&replies[0]).contains("whole non-negative number"), "input: {bad}");
            assert_eq!(
                flow.state(),
                FlowState::AwaitingAmount { category: Category::Expense }
            );
        }
    }

    #[test]
    fn test_cancel_returns_to_idle_from_any_state() {
        let (_dir, mut flow) = controller();
        for setup in [
            FlowEvent::NewEntry(Category::Income),
            FlowEvent::Stats,
        ] {
            flow.handle(1, setup);
            assert_ne!(flow.state(), FlowState::Idle);
            let replies = flow.handle(1, FlowEvent::Cancel);
            assert_eq!(text_of(&replies[0]), "Action cancelled.");
            assert_eq!(flow.state(), FlowState::Idle);
        }

        // Deep in the stats flow as well.
        flow.handle(1, FlowEvent::Stats);
        flow.handle(1, FlowEvent::DatePicked(d("2025-01-01")));
        assert_eq!(flow.state(), FlowState::AwaitingEndDate { start: d("2025-01-01") });
        flow.handle(1, FlowEvent::Cancel);
        assert_eq!(flow.state(), FlowState::Idle);
    }

    #[test]
    fn test_stats_flow_reversed_dates_abort() {
        let (_dir, mut flow) = controller();
        flow.handle(1, FlowEvent::Stats);
        flow.handle(1, FlowEvent::DatePicked(d("2025-01-10")));
        let replies = flow.handle(1, FlowEvent::DatePicked(d("2025-01-09")));
        assert_eq!(text_of(&replies[0]), "The end date is before the start date.");
        assert_eq!(flow.state(), FlowState::Idle);
    }

    #[test]
    fn test_stats_short_period_is_text_only() {
        let (_dir, mut flow) = controller();
        insert_at(&flow.ledger, 1, "income", 1000, "2025-02-01 10:00:00");
        flow.handle(1, FlowEvent::Stats);
        flow.handle(1, FlowEvent::DatePicked(d("2025-02-01")));
        // Span of 5 days stays below the default chart band.
        let replies = flow.handle(1, FlowEvent::DatePicked(d("2025-02-06")));
        assert_eq!(replies.len(), 1);
        assert!(text_of(&replies[0]).contains("Income: 1,000"));
        assert_eq!(flow.state(), FlowState::Idle);
    }

    #[test]
    fn test_stats_chart_band_includes_chart() {
        let (_dir, mut flow) = controller();
        insert_at(&flow.ledger, 1, "income", 1000, "2025-02-01 10:00:00");
        insert_at(&flow.ledger, 1, "expense", 300, "2025-02-05 10:00:00");
        flow.handle(1, FlowEvent::Stats);
        flow.handle(1, FlowEvent::DatePicked(d("2025-02-01")));
        // Span of 6 days is the lower edge of the default band.
        let replies = flow.handle(1, FlowEvent::DatePicked(d("2025-02-07")));
        assert_eq!(replies.len(), 2);
        assert!(text_of(&replies[0]).contains("Balance: 700"));
        assert!(matches!(&replies[1], Reply::Chart { bytes, .. } if !bytes.is_empty()));
    }

    #[test]
    fn test_stats_chart_band_without_data_says_so() {
        let (_dir, mut flow) = controller();
        flow.handle(1, FlowEvent::Stats);
        flow.handle(1, FlowEvent::DatePicked(d("2025-02-01")));
        let replies = flow.handle(1, FlowEvent::DatePicked(d("2025-02-07")));
        assert_eq!(replies.len(), 2);
        assert_eq!(text_of(&replies[1]), "No data to chart for this period.");
    }

    #[test]
    fn test_unexpected_event_reprompts() {
        let (_dir, mut flow) = controller();
        flow.handle(1, FlowEvent::Stats);
        let replies = flow.handle(1, FlowEvent::Text("not a date".to_string()));
        assert_eq!(text_of(&replies[0]), ASK_START);
        assert_eq!(flow.state(), FlowState::AwaitingStartDate);

        let replies = flow.handle(1, FlowEvent::Text("hello".to_string()));
        assert_eq!(text_of(&replies[0]), ASK_START);
    }

    #[test]
    fn test_idle_free_text_shows_menu() {
        let (_dir, mut flow) = controller();
        let replies = flow.handle(1, FlowEvent::Text("hello".to_string()));
        assert_eq!(text_of(&replies[0]), MENU);
        assert_eq!(flow.state(), FlowState::Idle);
    }
}
