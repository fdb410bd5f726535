use std::sync::Arc;

use pageqa_core::{
    ChatRole, Conversation, QaOutcome, QaService, Settlement, Suggestion,
    SuggestionCatalog, TransportError,
};
use ratatui::layout::Rect;
use ratatui::widgets::ListState;
use tokio::task::JoinHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusPane {
    Url,
    Question,
    Suggestions,
}

impl FocusPane {
    pub fn next(self) -> Self {
        match self {
            FocusPane::Url => FocusPane::Question,
            FocusPane::Question => FocusPane::Suggestions,
            FocusPane::Suggestions => FocusPane::Url,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            FocusPane::Url => FocusPane::Suggestions,
            FocusPane::Question => FocusPane::Url,
            FocusPane::Suggestions => FocusPane::Question,
        }
    }
}

/// Reachability of the Q&A backend as last observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceStatus {
    Checking,
    Online,
    Offline,
}

impl ServiceStatus {
    pub fn label(&self) -> &'static str {
        match self {
            ServiceStatus::Checking => "checking",
            ServiceStatus::Online => "online",
            ServiceStatus::Offline => "offline",
        }
    }
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub focus: FocusPane,
    pub conversation: Conversation,

    // Text field cursors (character indices)
    pub url_cursor: usize,
    pub question_cursor: usize,

    // Suggestion catalog and sidebar selection
    pub suggestions: SuggestionCatalog,
    pub suggestion_state: ListState,

    // Chat pane
    pub chat_scroll: u16,
    pub chat_height: u16,     // inner height, updated during render
    pub chat_width: u16,      // inner width, updated during render
    pub chat_line_count: u16, // rendered transcript height, updated during render
    pub chat_area: Option<Rect>,
    pub followed_revision: u64,

    // Animation state
    pub animation_frame: u8,

    // Backend
    pub service: Arc<dyn QaService>,
    pub service_url: String,
    pub service_status: ServiceStatus,
    pub query_task: Option<JoinHandle<QaOutcome>>,
    pub ping_task: Option<JoinHandle<bool>>,
}

impl App {
    pub fn new(
        service: Arc<dyn QaService>,
        service_url: String,
        suggestions: SuggestionCatalog,
    ) -> Self {
        let mut suggestion_state = ListState::default();
        if !suggestions.general.is_empty() {
            suggestion_state.select(Some(0));
        }

        Self {
            should_quit: false,
            focus: FocusPane::Url,
            conversation: Conversation::new(),
            url_cursor: 0,
            question_cursor: 0,
            suggestions,
            suggestion_state,
            chat_scroll: 0,
            chat_height: 0,
            chat_width: 0,
            chat_line_count: 0,
            chat_area: None,
            followed_revision: 0,
            animation_frame: 0,
            service,
            service_url,
            service_status: ServiceStatus::Checking,
            query_task: None,
            ping_task: None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.conversation.session().is_pending()
    }

    /// Check the backend once in the background.
    pub fn start_health_check(&mut self) {
        let service = Arc::clone(&self.service);
        self.service_status = ServiceStatus::Checking;
        self.ping_task = Some(tokio::spawn(async move { service.ping().await }));
    }

    /// Hand the current draft to the dispatcher and run the request in the
    /// background. Does nothing when the dispatcher rejects the draft.
    pub fn submit_question(&mut self) {
        let Some(pending) = self.conversation.begin_submission() else {
            return;
        };

        let service = Arc::clone(&self.service);
        self.query_task = Some(tokio::spawn(async move {
            service.ask(&pending.url, &pending.question).await
        }));
    }

    /// Collect finished background work. Called once per event loop turn.
    pub async fn poll_tasks(&mut self) {
        if matches!(&self.query_task, Some(task) if task.is_finished()) {
            if let Some(task) = self.query_task.take() {
                let outcome = task.await.unwrap_or_else(|err| {
                    log::error!("question task did not complete: {err}");
                    QaOutcome::Transport(TransportError::Other(None))
                });
                self.finish_query(outcome);
            }
        }

        if matches!(&self.ping_task, Some(task) if task.is_finished()) {
            if let Some(task) = self.ping_task.take() {
                let online = task.await.unwrap_or(false);
                log::info!("health check of {}: online={online}", self.service_url);
                self.service_status = if online {
                    ServiceStatus::Online
                } else {
                    ServiceStatus::Offline
                };
            }
        }
    }

    pub fn finish_query(&mut self, outcome: QaOutcome) {
        let Some(settlement) = self.conversation.settle(outcome) else {
            return;
        };

        self.question_cursor = 0;
        // A settled response outranks a health check still in flight
        if let Some(task) = self.ping_task.take() {
            task.abort();
        }
        self.service_status = match settlement {
            Settlement::NetworkUnreachable => ServiceStatus::Offline,
            Settlement::Success | Settlement::RemoteError | Settlement::TransportFailure => {
                ServiceStatus::Online
            }
        };
    }

    pub fn apply_suggestion(&mut self, suggestion: &Suggestion) {
        self.conversation.apply_suggestion(&suggestion.prompt);
        self.question_cursor = suggestion.prompt.chars().count();
        self.focus = FocusPane::Question;
    }

    /// Apply the highlighted general suggestion.
    pub fn apply_selected_suggestion(&mut self) {
        let selected = self
            .suggestion_state
            .selected()
            .and_then(|i| self.suggestions.general.get(i))
            .cloned();
        if let Some(suggestion) = selected {
            self.apply_suggestion(&suggestion);
        }
    }

    /// Apply the n-th follow-up prompt. Follow-ups only exist once an answer
    /// has been shown.
    pub fn apply_follow_up(&mut self, index: usize) {
        let has_answer = self
            .conversation
            .transcript()
            .snapshot()
            .iter()
            .any(|message| message.role == ChatRole::Assistant);
        if !has_answer {
            return;
        }
        if let Some(suggestion) = self.suggestions.follow_up.get(index).cloned() {
            self.apply_suggestion(&suggestion);
        }
    }

    pub fn suggestion_nav_down(&mut self) {
        let len = self.suggestions.general.len();
        if len > 0 {
            let i = self.suggestion_state.selected().unwrap_or(0);
            self.suggestion_state.select(Some((i + 1).min(len - 1)));
        }
    }

    pub fn suggestion_nav_up(&mut self) {
        let i = self.suggestion_state.selected().unwrap_or(0);
        self.suggestion_state.select(Some(i.saturating_sub(1)));
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.is_pending() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    /// Record the transcript height measured by the renderer.
    pub fn set_chat_line_count(&mut self, lines: usize) {
        self.chat_line_count = u16::try_from(lines).unwrap_or(u16::MAX);
    }

    /// Scroll to the newest entry whenever the transcript changed since the
    /// last call. Expects `chat_line_count` to be current.
    pub fn follow_transcript(&mut self) {
        let revision = self.conversation.transcript().revision();
        if revision != self.followed_revision {
            self.followed_revision = revision;
            self.scroll_chat_to_bottom();
        }
    }

    pub fn scroll_chat_to_bottom(&mut self) {
        self.chat_scroll = self.chat_line_count.saturating_sub(self.chat_height);
    }

    pub fn scroll_chat_up(&mut self, lines: u16) {
        self.chat_scroll = self.chat_scroll.saturating_sub(lines);
    }

    pub fn scroll_chat_down(&mut self, lines: u16) {
        let max = self.chat_line_count.saturating_sub(self.chat_height);
        self.chat_scroll = self.chat_scroll.saturating_add(lines).min(max);
    }

    /// Leave the screen: nothing in flight may settle after this.
    pub fn quit(&mut self) {
        self.should_quit = true;
        if let Some(task) = self.query_task.take() {
            log::info!("aborting in-flight question on exit");
            task.abort();
        }
        if let Some(task) = self.ping_task.take() {
            task.abort();
        }
    }
}

/// Hint line shown under each answer, e.g. `[Alt+1] More details`.
pub fn follow_up_hint(follow_ups: &[Suggestion]) -> String {
    follow_ups
        .iter()
        .take(9)
        .enumerate()
        .map(|(i, suggestion)| format!("[Alt+{}] {}", i + 1, suggestion.label))
        .collect::<Vec<_>>()
        .join("  ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use pageqa_core::ChatMessage;

    struct FixedService(QaOutcome);

    #[async_trait]
    impl QaService for FixedService {
        async fn ask(&self, _url: &str, _question: &str) -> QaOutcome {
            self.0.clone()
        }

        async fn ping(&self) -> bool {
            true
        }
    }

    fn app_with(outcome: QaOutcome) -> App {
        App::new(
            Arc::new(FixedService(outcome)),
            "http://localhost:5001".into(),
            SuggestionCatalog::default(),
        )
    }

    async fn settle_pending(app: &mut App) {
        while app.query_task.is_some() {
            tokio::task::yield_now().await;
            app.poll_tasks().await;
        }
    }

    #[tokio::test]
    async fn test_submit_runs_in_background_and_settles() {
        let mut app = app_with(QaOutcome::Answer("We offer X, Y, Z.".into()));
        app.conversation.set_draft_question("What courses are offered?");
        app.question_cursor = 25;

        app.submit_question();
        assert!(app.is_pending());
        assert_eq!(app.conversation.transcript().len(), 1);

        settle_pending(&mut app).await;
        assert!(!app.is_pending());
        assert_eq!(app.question_cursor, 0);
        assert_eq!(app.service_status, ServiceStatus::Online);
        assert_eq!(
            app.conversation.transcript().last(),
            Some(&ChatMessage::assistant("We offer X, Y, Z."))
        );
    }

    #[tokio::test]
    async fn test_submit_while_pending_spawns_nothing() {
        let mut app = app_with(QaOutcome::Answer("a".into()));
        app.conversation.set_draft_question("one");
        app.submit_question();
        app.conversation.set_draft_question("two");

        app.submit_question();
        assert_eq!(app.conversation.transcript().len(), 1);

        settle_pending(&mut app).await;
        assert_eq!(app.conversation.transcript().len(), 2);
    }

    #[tokio::test]
    async fn test_unreachable_marks_service_offline() {
        let mut app = app_with(QaOutcome::Transport(TransportError::NetworkUnreachable));
        app.conversation.set_draft_question("hello");
        app.submit_question();
        settle_pending(&mut app).await;

        assert_eq!(app.service_status, ServiceStatus::Offline);
        assert_eq!(
            app.conversation.transcript().last().map(|m| m.role),
            Some(ChatRole::Error)
        );
    }

    #[tokio::test]
    async fn test_follow_up_requires_an_answer() {
        let mut app = app_with(QaOutcome::Answer("a".into()));
        app.apply_follow_up(2);
        assert_eq!(app.conversation.session().draft_question(), "");

        app.conversation.set_draft_question("q");
        app.submit_question();
        settle_pending(&mut app).await;

        app.apply_follow_up(2);
        assert_eq!(app.conversation.session().draft_question(), "How can I apply?");
        assert_eq!(app.focus, FocusPane::Question);
        assert_eq!(app.question_cursor, "How can I apply?".chars().count());
    }

    #[tokio::test]
    async fn test_selected_suggestion_fills_draft() {
        let mut app = app_with(QaOutcome::Answer("a".into()));
        app.suggestion_nav_down();
        app.apply_selected_suggestion();

        assert_eq!(
            app.conversation.session().draft_question(),
            "What are the contact details?"
        );
        assert!(app.conversation.transcript().is_empty());
    }

    #[tokio::test]
    async fn test_follow_transcript_scrolls_on_new_entries_only() {
        let mut app = app_with(QaOutcome::Answer("a".into()));
        app.chat_height = 3;

        app.follow_transcript();
        assert_eq!(app.chat_scroll, 0);

        app.conversation.set_draft_question("q");
        app.submit_question();
        app.set_chat_line_count(5);
        app.follow_transcript();
        assert_eq!(app.chat_scroll, 2);

        app.chat_scroll = 0;
        app.follow_transcript();
        assert_eq!(app.chat_scroll, 0);
    }

    #[tokio::test]
    async fn test_manual_scroll_is_clamped_to_rendered_height() {
        let mut app = app_with(QaOutcome::Answer("a".into()));
        app.chat_height = 10;
        app.set_chat_line_count(14);

        app.scroll_chat_down(100);
        assert_eq!(app.chat_scroll, 4);
        app.scroll_chat_up(100);
        assert_eq!(app.chat_scroll, 0);
    }

    struct SlowOfflineService;

    #[async_trait]
    impl QaService for SlowOfflineService {
        async fn ask(&self, _url: &str, _question: &str) -> QaOutcome {
            QaOutcome::Answer("fine".into())
        }

        async fn ping(&self) -> bool {
            tokio::time::sleep(std::time::Duration::from_millis(50)).await;
            false
        }
    }

    #[tokio::test]
    async fn test_stale_health_check_does_not_override_settlement() {
        let mut app = App::new(
            Arc::new(SlowOfflineService),
            "http://localhost:5001".into(),
            SuggestionCatalog::default(),
        );
        app.start_health_check();
        app.conversation.set_draft_question("q");
        app.submit_question();
        settle_pending(&mut app).await;
        assert_eq!(app.service_status, ServiceStatus::Online);
        assert!(app.ping_task.is_none());

        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        app.poll_tasks().await;
        assert_eq!(app.service_status, ServiceStatus::Online);
    }

    #[test]
    fn test_follow_up_hint_numbers_labels() {
        let hint = follow_up_hint(&SuggestionCatalog::default().follow_up);
        assert_eq!(
            hint,
            "[Alt+1] More details  [Alt+2] Requirements  [Alt+3] How to apply"
        );
    }
}
