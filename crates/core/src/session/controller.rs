use rand::RngCore;

use super::script;
use super::{
    ActionOutcome, AnswerSlot, Pacing, Phase, QuestionStep, SessionNotice, SessionState,
    SessionView,
};
use crate::catalog::QuizCatalog;
use crate::chat::{ChatMessage, MessageKind, Role, Transcript};
use crate::choreography::{Choreographer, Cue};
use crate::clock::{QuestionClock, TickOutcome};
use crate::error::CoreError;
use crate::identity::normalize_email;
use crate::level::Level;
use crate::question::{Question, ALTERNATIVE_COUNT};
use crate::results::NewQuizResult;
use crate::scheduler::{Scheduler, SlotGenerations, TimerSlot, Wake, WakeKind};
use crate::selector::{select_questions, Shortage};
use crate::types::Timestamp;

/// Owns all mutable state of one quiz attempt.
///
/// Every mutation goes through a method on this type. Delayed work is
/// requested from the [`Scheduler`] and comes back through
/// [`QuizController::handle_wake`]; side effects that leave the core
/// (persisting a result) are queued as [`SessionNotice`]s.
pub struct QuizController<S: Scheduler> {
    catalog: QuizCatalog,
    scheduler: S,
    rng: Box<dyn RngCore + Send>,
    pacing: Pacing,

    phase: Phase,
    questions: Vec<Question>,
    shortages: Vec<Shortage>,
    current: usize,
    score: u32,
    answers: Vec<AnswerSlot>,
    email: Option<String>,
    started_at: Option<Timestamp>,
    level: Option<Level>,
    pending_feedback: Option<Feedback>,
    pending_reply: Option<&'static str>,

    clock: QuestionClock,
    transcript: Transcript,
    choreographer: Choreographer,
    generations: SlotGenerations,
    notices: Vec<SessionNotice>,
}

#[derive(Debug, Clone, Copy)]
struct Feedback {
    correct: bool,
    timed_out: bool,
}

impl<S: Scheduler> QuizController<S> {
    pub fn new(
        catalog: QuizCatalog,
        scheduler: S,
        rng: Box<dyn RngCore + Send>,
        pacing: Pacing,
    ) -> Self {
        let catalog = catalog.reconciled();
        let clock = QuestionClock::new(
            catalog.settings.timer_enabled,
            catalog.settings.timer_seconds,
        );
        let mut controller = Self {
            catalog,
            scheduler,
            rng,
            pacing,
            phase: Phase::Idle,
            questions: Vec::new(),
            shortages: Vec::new(),
            current: 0,
            score: 0,
            answers: Vec::new(),
            email: None,
            started_at: None,
            level: None,
            pending_feedback: None,
            pending_reply: None,
            clock,
            transcript: Transcript::new(),
            choreographer: Choreographer::new(pacing.choreography()),
            generations: SlotGenerations::default(),
            notices: Vec::new(),
        };

        let welcome = controller.welcome_message(script::WELCOME);
        controller.transcript.push(welcome);
        controller.prepare_questions();
        controller
    }

    // -----------------------------------------------------------------------
    // Actions
    // -----------------------------------------------------------------------

    /// Bind the participant and present the first question.
    ///
    /// The identifier is validated and bound before the first clock tick is
    /// scheduled. An invalid identifier leaves the session untouched.
    pub fn start_session(&mut self, identifier: &str) -> Result<ActionOutcome, CoreError> {
        if self.phase != Phase::Idle {
            return Ok(ActionOutcome::Ignored);
        }
        let email = normalize_email(identifier)?;

        if self.questions.is_empty() {
            self.prepare_questions();
        }
        if self.questions.is_empty() {
            return Err(CoreError::Validation("No questions are available".into()));
        }

        let settings = &self.catalog.settings;
        self.clock = QuestionClock::new(settings.timer_enabled, settings.timer_seconds);
        self.current = 0;
        self.score = 0;
        self.answers = vec![AnswerSlot::Unanswered; self.questions.len()];
        self.level = None;
        self.pending_feedback = None;
        self.email = Some(email);
        self.started_at = Some(self.scheduler.now());

        self.set_phase(Phase::Playing(QuestionStep::Answering));
        tracing::debug!(
            questions = self.questions.len(),
            timer_enabled = self.clock.is_enabled(),
            "Quiz session started"
        );
        self.present_question();
        Ok(ActionOutcome::Applied)
    }

    /// Submit an answer for the current question. `None` is a timeout.
    ///
    /// Ignored unless the current question is accepting answers.
    pub fn submit_answer(&mut self, choice: Option<usize>) -> ActionOutcome {
        if self.phase != Phase::Playing(QuestionStep::Answering) {
            return ActionOutcome::Ignored;
        }
        if choice.is_some_and(|c| c >= ALTERNATIVE_COUNT) {
            return ActionOutcome::Ignored;
        }
        self.set_phase(Phase::Playing(QuestionStep::Reviewing));

        self.clock.stop();
        self.disarm(TimerSlot::QuestionClock);

        let index = self.current;
        let question = &self.questions[index];
        let correct = question.is_correct(choice);
        let content = match choice {
            Some(c) => script::chosen_option(question, c),
            None => script::TIMEOUT_NOTICE.to_string(),
        };
        let id = self.transcript.next_id("a");
        let message = ChatMessage::settled(id, Role::User, MessageKind::Text, content, self.now());
        self.append(message);

        if correct {
            self.score += 1;
        }
        self.answers[index] = if correct {
            AnswerSlot::Correct
        } else {
            AnswerSlot::Incorrect
        };
        self.notices.push(SessionNotice::AnswerRecorded {
            index,
            correct,
            timed_out: choice.is_none(),
        });

        self.pending_feedback = Some(Feedback {
            correct,
            timed_out: choice.is_none(),
        });
        self.arm(TimerSlot::Feedback, WakeKind::ShowFeedback, self.pacing.feedback_delay);
        ActionOutcome::Applied
    }

    /// Close the session once every question is resolved.
    ///
    /// Emits the result message and a [`SessionNotice::Completed`] carrying
    /// the record to persist. Ignored while questions remain.
    pub fn finalize_session(&mut self) -> ActionOutcome {
        let last = self.questions.len().saturating_sub(1);
        if self.phase != Phase::Playing(QuestionStep::Advancing) || self.current != last {
            return ActionOutcome::Ignored;
        }

        self.cancel_all();
        self.clock.stop();

        let now = self.now();
        let duration_seconds = self
            .started_at
            .map(|start| (now - start).num_seconds().max(0))
            .unwrap_or(0);
        let level = self.catalog.tiers.resolve(self.score).clone();
        let total = self.questions.len();

        self.set_phase(Phase::Finished);
        let id = self.transcript.next_id("result");
        let message = ChatMessage::settled(
            id,
            Role::Assistant,
            MessageKind::Result,
            script::result(self.score, total, &level),
            now,
        );
        self.append(message);

        tracing::info!(
            score = self.score,
            total,
            level = %level.name,
            duration_seconds,
            "Quiz session finished"
        );
        self.level = Some(level);
        self.notices.push(SessionNotice::Completed(NewQuizResult {
            email: self.email.clone().unwrap_or_default(),
            score: self.score,
            total_questions: total as u32,
            duration_seconds,
        }));
        ActionOutcome::Applied
    }

    /// Discard the attempt and return to the welcome state with a freshly
    /// shuffled question set. `catalog` replaces the current one when given.
    pub fn restart_session(&mut self, catalog: Option<QuizCatalog>) -> ActionOutcome {
        if self.phase == Phase::Idle {
            return ActionOutcome::Ignored;
        }
        self.cancel_all();
        self.choreographer.clear();
        if let Some(catalog) = catalog {
            self.catalog = catalog.reconciled();
        }

        self.reset_attempt();
        let first = self.welcome_message(script::RESTART);
        self.transcript.reset_with(first);
        self.begin_choreography();

        self.set_phase(Phase::Idle);
        self.prepare_questions();
        ActionOutcome::Applied
    }

    /// Swap in fresh content before the session starts.
    pub fn refresh_catalog(&mut self, catalog: QuizCatalog) -> ActionOutcome {
        if self.phase != Phase::Idle {
            return ActionOutcome::Ignored;
        }
        self.catalog = catalog.reconciled();
        self.reset_attempt();
        self.prepare_questions();
        ActionOutcome::Applied
    }

    /// Free-text chat input. Never affects scoring.
    pub fn send_text(&mut self, text: &str) -> ActionOutcome {
        let text = text.trim();
        if text.is_empty() {
            return ActionOutcome::Ignored;
        }
        let id = self.transcript.next_id("u");
        let message = ChatMessage::settled(id, Role::User, MessageKind::Text, text, self.now());
        self.append(message);

        self.pending_reply = Some(match self.phase.state() {
            SessionState::Idle => script::REPLY_IDLE,
            SessionState::Playing => script::REPLY_PLAYING,
            SessionState::Finished => script::REPLY_FINISHED,
        });
        self.arm(TimerSlot::Reply, WakeKind::Reply, self.pacing.feedback_delay);
        ActionOutcome::Applied
    }

    /// Deliver a scheduled wake. Stale wakes are ignored.
    pub fn handle_wake(&mut self, wake: Wake) -> ActionOutcome {
        if !self.generations.is_current(&wake) {
            tracing::trace!(?wake, "Dropping stale wake");
            return ActionOutcome::Ignored;
        }
        self.generations.disarm(wake.slot);

        match wake.kind {
            WakeKind::ClockTick => self.on_clock_tick(),
            WakeKind::ShowFeedback => self.on_show_feedback(),
            WakeKind::Advance => self.on_advance(),
            WakeKind::TypingElapsed => {
                let now = self.now();
                let cue = self.choreographer.typing_elapsed(&mut self.transcript, now);
                self.schedule_cue(cue);
                ActionOutcome::Applied
            }
            WakeKind::RevealTick => {
                let now = self.now();
                let cue = self.choreographer.reveal_tick(&mut self.transcript, now);
                self.schedule_cue(cue);
                ActionOutcome::Applied
            }
            WakeKind::Reply => match self.pending_reply.take() {
                Some(reply) => {
                    let message = self.assistant_text(reply.to_string());
                    self.append(message);
                    ActionOutcome::Applied
                }
                None => ActionOutcome::Ignored,
            },
        }
    }

    /// Take the side effects queued since the last call.
    pub fn drain_notices(&mut self) -> Vec<SessionNotice> {
        std::mem::take(&mut self.notices)
    }

    // -----------------------------------------------------------------------
    // Read side
    // -----------------------------------------------------------------------

    pub fn view(&self) -> SessionView {
        let playing = self.phase.state() == SessionState::Playing;
        let current = self.questions.get(self.current).filter(|_| playing);
        let settings = &self.catalog.settings;
        SessionView {
            state: self.phase.state(),
            messages: self.transcript.messages().to_vec(),
            current_question: current.map(|_| self.current),
            total_questions: self.total_questions(),
            score: self.score,
            answers: self.answers.clone(),
            timer_enabled: self.clock.is_enabled(),
            time_remaining: (playing && self.clock.is_enabled())
                .then(|| self.clock.remaining_secs()),
            show_options: self.options_visible(),
            show_difficulty_badge: settings.show_difficulty_badge,
            current_difficulty: current.map(|q| q.difficulty),
            email: self.email.clone(),
            started_at: self.started_at,
            level: self.level.clone(),
        }
    }

    /// Options are offered while the last message is the current question
    /// and it still accepts answers.
    pub fn options_visible(&self) -> bool {
        self.phase == Phase::Playing(QuestionStep::Answering)
            && self
                .transcript
                .last()
                .is_some_and(|m| m.kind == MessageKind::Question)
    }

    pub fn state(&self) -> SessionState {
        self.phase.state()
    }

    pub fn is_processing(&self) -> bool {
        matches!(
            self.phase,
            Phase::Playing(QuestionStep::Reviewing | QuestionStep::Advancing)
        )
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn answers(&self) -> &[AnswerSlot] {
        &self.answers
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn total_questions(&self) -> usize {
        self.answers.len()
    }

    /// The selected sequence for the current (or next) attempt.
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn shortages(&self) -> &[Shortage] {
        &self.shortages
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    pub fn level(&self) -> Option<&Level> {
        self.level.as_ref()
    }

    pub fn clock(&self) -> &QuestionClock {
        &self.clock
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn catalog(&self) -> &QuizCatalog {
        &self.catalog
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    // -----------------------------------------------------------------------
    // Wake handlers
    // -----------------------------------------------------------------------

    fn on_clock_tick(&mut self) -> ActionOutcome {
        if self.phase != Phase::Playing(QuestionStep::Answering) {
            return ActionOutcome::Ignored;
        }
        match self.clock.tick() {
            TickOutcome::Ignored => ActionOutcome::Ignored,
            TickOutcome::Running { .. } => {
                self.arm(TimerSlot::QuestionClock, WakeKind::ClockTick, self.pacing.tick_interval);
                ActionOutcome::Applied
            }
            TickOutcome::Expired => {
                tracing::debug!(question = self.current, "Question timed out");
                self.submit_answer(None)
            }
        }
    }

    fn on_show_feedback(&mut self) -> ActionOutcome {
        if self.phase != Phase::Playing(QuestionStep::Reviewing) {
            return ActionOutcome::Ignored;
        }
        let Some(feedback) = self.pending_feedback.take() else {
            return ActionOutcome::Ignored;
        };
        let question = &self.questions[self.current];
        let content = script::feedback(question, feedback.correct, feedback.timed_out);
        let difficulty = self
            .catalog
            .settings
            .show_difficulty_badge
            .then_some(question.difficulty);
        let id = self.transcript.next_id("f");
        let message = ChatMessage::settled(id, Role::Assistant, MessageKind::Text, content, self.now())
            .with_correctness(feedback.correct)
            .with_question_index(self.current)
            .with_difficulty(difficulty);
        self.append(message);

        self.set_phase(Phase::Playing(QuestionStep::Advancing));
        self.arm(TimerSlot::Feedback, WakeKind::Advance, self.pacing.advance_delay);
        ActionOutcome::Applied
    }

    fn on_advance(&mut self) -> ActionOutcome {
        if self.phase != Phase::Playing(QuestionStep::Advancing) {
            return ActionOutcome::Ignored;
        }
        if self.current + 1 < self.questions.len() {
            self.current += 1;
            self.set_phase(Phase::Playing(QuestionStep::Answering));
            self.present_question();
            ActionOutcome::Applied
        } else {
            self.finalize_session()
        }
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    fn present_question(&mut self) {
        let index = self.current;
        let total = self.questions.len();
        let question = &self.questions[index];
        let difficulty = self
            .catalog
            .settings
            .show_difficulty_badge
            .then_some(question.difficulty);
        let id = self.transcript.next_id("q");
        let message = ChatMessage::settled(
            id,
            Role::Assistant,
            MessageKind::Question,
            script::question(index, total, question),
            self.now(),
        )
        .with_options(question.option_labels())
        .with_question_index(index)
        .with_difficulty(difficulty);
        self.append(message);

        if self.clock.arm() {
            self.arm(TimerSlot::QuestionClock, WakeKind::ClockTick, self.pacing.tick_interval);
        } else {
            self.disarm(TimerSlot::QuestionClock);
        }
        self.notices.push(SessionNotice::QuestionPresented { index });
    }

    /// Run the selector for the next attempt.
    fn prepare_questions(&mut self) {
        let selection = select_questions(
            &self.catalog.questions,
            &self.catalog.settings,
            self.rng.as_mut(),
        );
        self.questions = selection.questions;
        self.shortages = selection.shortages;
        self.answers = vec![AnswerSlot::Unanswered; self.questions.len()];
    }

    fn reset_attempt(&mut self) {
        let settings = &self.catalog.settings;
        self.clock = QuestionClock::new(settings.timer_enabled, settings.timer_seconds);
        self.current = 0;
        self.score = 0;
        self.email = None;
        self.started_at = None;
        self.level = None;
        self.pending_feedback = None;
        self.pending_reply = None;
    }

    /// Append a message, settling whatever was still animating. Assistant
    /// messages start their own choreography.
    fn append(&mut self, message: ChatMessage) {
        let now = self.now();
        if self.choreographer.settle(&mut self.transcript, now).is_some() {
            self.disarm(TimerSlot::Choreography);
        }
        let role = message.role;
        self.transcript.push(message);
        if role == Role::Assistant {
            self.begin_choreography();
        }
    }

    fn begin_choreography(&mut self) {
        let cue = self.choreographer.begin(&mut self.transcript);
        self.schedule_cue(cue);
    }

    fn schedule_cue(&mut self, cue: Option<Cue>) {
        match cue {
            Some(Cue::TypingElapsed(delay)) => {
                self.arm(TimerSlot::Choreography, WakeKind::TypingElapsed, delay)
            }
            Some(Cue::RevealTick(delay)) => {
                self.arm(TimerSlot::Choreography, WakeKind::RevealTick, delay)
            }
            None => {}
        }
    }

    fn welcome_message(&mut self, content: &str) -> ChatMessage {
        let id = self.transcript.next_id("welcome");
        ChatMessage::settled(id, Role::Assistant, MessageKind::Welcome, content, self.now())
            .with_options(vec![script::START_OPTION.to_string()])
    }

    fn assistant_text(&mut self, content: String) -> ChatMessage {
        let id = self.transcript.next_id("m");
        ChatMessage::settled(id, Role::Assistant, MessageKind::Text, content, self.now())
    }

    fn set_phase(&mut self, phase: Phase) {
        let before = self.phase.state();
        self.phase = phase;
        if before != phase.state() {
            self.notices.push(SessionNotice::StateChanged(phase.state()));
        }
    }

    fn arm(&mut self, slot: TimerSlot, kind: WakeKind, delay: std::time::Duration) {
        let generation = self.generations.arm(slot);
        self.scheduler.schedule(
            delay,
            Wake {
                slot,
                generation,
                kind,
            },
        );
    }

    fn disarm(&mut self, slot: TimerSlot) {
        self.generations.disarm(slot);
        self.scheduler.cancel(slot);
    }

    fn cancel_all(&mut self) {
        for slot in TimerSlot::ALL {
            self.disarm(slot);
        }
        let now = self.now();
        self.choreographer.settle(&mut self.transcript, now);
        self.pending_feedback = None;
        self.pending_reply = None;
    }

    fn now(&self) -> Timestamp {
        self.scheduler.now()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use assert_matches::assert_matches;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::level::TierTable;
    use crate::question::fixtures::pool;
    use crate::scheduler::ManualScheduler;
    use crate::settings::{DifficultyQuota, QuizSettings};

    const EMAIL: &str = "Participant@Example.com";
    const CORRECT: Option<usize> = Some(1);
    const WRONG: Option<usize> = Some(0);

    type Controller = QuizController<ManualScheduler>;

    fn controller_with(settings: QuizSettings) -> Controller {
        let catalog = QuizCatalog::new(pool(5, 6, 5), TierTable::builtin(), settings);
        QuizController::new(
            catalog,
            ManualScheduler::new(),
            Box::new(StdRng::seed_from_u64(7)),
            Pacing::default(),
        )
    }

    fn controller() -> Controller {
        controller_with(QuizSettings::default())
    }

    /// Deliver every wake due within the next `by` of virtual time.
    fn advance(c: &mut Controller, by: Duration) {
        let deadline = c.scheduler().elapsed() + by;
        while let Some(wake) = c.scheduler_mut().pop_due(deadline) {
            c.handle_wake(wake);
        }
    }

    /// Time from a submission to the next question being presented.
    fn resolve_delay() -> Duration {
        let p = Pacing::default();
        p.feedback_delay + p.advance_delay
    }

    fn completed(notices: &[SessionNotice]) -> Vec<&NewQuizResult> {
        notices
            .iter()
            .filter_map(|n| match n {
                SessionNotice::Completed(r) => Some(r),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn scenario_all_correct_reaches_top_tier_and_persists_once() {
        let mut c = controller();
        assert_eq!(c.start_session(EMAIL).unwrap(), ActionOutcome::Applied);
        assert_eq!(c.state(), SessionState::Playing);
        assert_eq!(c.total_questions(), 10);

        for i in 0..10 {
            assert_eq!(c.current_index(), i);
            assert_eq!(c.submit_answer(CORRECT), ActionOutcome::Applied);
            advance(&mut c, resolve_delay());
        }

        assert_eq!(c.state(), SessionState::Finished);
        assert_eq!(c.score(), 10);
        assert_eq!(c.level().map(|l| l.min_score), Some(10));
        assert!(c.answers().iter().all(|a| *a == AnswerSlot::Correct));

        let notices = c.drain_notices();
        let results = completed(&notices);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].score, 10);
        assert_eq!(results[0].total_questions, 10);
        assert_eq!(results[0].email, "participant@example.com");

        let last = c.transcript().last().unwrap();
        assert_eq!(last.kind, MessageKind::Result);
        assert!(last.content.contains("**10** out of **10**"));
    }

    #[test]
    fn quota_beyond_the_levels_still_ranks_a_perfect_run_on_top() {
        let mut c = controller_with(QuizSettings {
            quota: DifficultyQuota {
                easy: 5,
                medium: 5,
                hard: 5,
            },
            ..QuizSettings::default()
        });
        c.start_session(EMAIL).unwrap();
        let total = c.total_questions();
        assert_eq!(total, 10);

        let tiers = &c.catalog().tiers;
        for score in 0..=total as u32 {
            let bands = tiers.levels().iter().filter(|l| l.contains(score)).count();
            assert_eq!(bands, 1, "score {score} must match exactly one band");
        }

        for _ in 0..total {
            c.submit_answer(CORRECT);
            advance(&mut c, resolve_delay());
        }
        assert_eq!(c.state(), SessionState::Finished);
        assert_eq!(c.score(), 10);
        assert_eq!(c.level().map(|l| l.name.as_str()), Some("Ambassador"));
    }

    #[test]
    fn refreshed_catalog_is_reconciled_before_use() {
        let mut c = controller();
        let stale = QuizCatalog {
            questions: pool(5, 6, 5),
            tiers: TierTable::builtin(),
            settings: QuizSettings {
                quota: DifficultyQuota {
                    easy: 5,
                    medium: 6,
                    hard: 5,
                },
                ..QuizSettings::default()
            },
        };
        assert_eq!(c.refresh_catalog(stale), ActionOutcome::Applied);
        assert_eq!(c.catalog().settings.quota, DifficultyQuota::default());

        c.start_session(EMAIL).unwrap();
        assert_eq!(c.total_questions(), 10);
    }

    #[test]
    fn scenario_timeout_on_second_question_counts_as_incorrect() {
        let mut c = controller();
        c.start_session(EMAIL).unwrap();
        c.submit_answer(CORRECT);
        advance(&mut c, resolve_delay());
        assert_eq!(c.current_index(), 1);

        advance(&mut c, Duration::from_secs(180));

        assert_eq!(&c.answers()[..2], &[AnswerSlot::Correct, AnswerSlot::Incorrect]);
        assert!(c.answers()[2..].iter().all(|a| *a == AnswerSlot::Unanswered));
        assert_eq!(c.score(), 1);
        let timeout = c
            .transcript()
            .messages()
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .unwrap();
        assert_eq!(timeout.content, script::TIMEOUT_NOTICE);
    }

    #[test]
    fn scenario_invalid_identifier_keeps_session_idle() {
        let mut c = controller();
        let before = c.transcript().len();

        assert_matches!(c.start_session("not-an-email"), Err(CoreError::Validation(_)));
        assert_eq!(c.state(), SessionState::Idle);
        assert_eq!(c.transcript().len(), before);
        assert!(c.email().is_none());
        assert!(!c.transcript().messages().iter().any(|m| m.kind == MessageKind::Question));
        assert_eq!(c.scheduler().pending_count(), 0);
    }

    #[test]
    fn scenario_restart_after_finish_prepares_a_fresh_set() {
        let mut c = controller();
        c.start_session(EMAIL).unwrap();
        for _ in 0..10 {
            c.submit_answer(WRONG);
            advance(&mut c, resolve_delay());
        }
        assert_eq!(c.state(), SessionState::Finished);

        assert_eq!(c.restart_session(None), ActionOutcome::Applied);
        assert_eq!(c.state(), SessionState::Idle);
        assert_eq!(c.score(), 0);
        assert_eq!(c.answers(), &[AnswerSlot::Unanswered; 10]);
        assert_eq!(c.questions().len(), 10);
        assert!(c.email().is_none());
        assert!(c.level().is_none());
        assert_eq!(c.transcript().len(), 1);
        assert_eq!(c.transcript().messages()[0].content, script::RESTART);

        assert_eq!(c.start_session("other@example.com").unwrap(), ActionOutcome::Applied);
        assert_eq!(c.email(), Some("other@example.com"));
    }

    #[test]
    fn second_submission_while_processing_has_no_effect() {
        let mut c = controller();
        c.start_session(EMAIL).unwrap();
        c.submit_answer(CORRECT);
        let score = c.score();
        let answers = c.answers().to_vec();
        let len = c.transcript().len();

        assert!(c.is_processing());
        assert_eq!(c.submit_answer(WRONG), ActionOutcome::Ignored);
        assert_eq!(c.submit_answer(None), ActionOutcome::Ignored);

        assert_eq!(c.score(), score);
        assert_eq!(c.answers(), answers.as_slice());
        assert_eq!(c.transcript().len(), len);
    }

    #[test]
    fn timer_fires_after_exactly_limit_ticks_and_only_once() {
        let settings = QuizSettings {
            timer_seconds: 30,
            ..QuizSettings::default()
        };
        let mut c = controller_with(settings);
        c.start_session(EMAIL).unwrap();

        advance(&mut c, Duration::from_millis(29_999));
        assert_eq!(c.answers()[0], AnswerSlot::Unanswered);
        assert_eq!(c.clock().remaining_secs(), 1);

        advance(&mut c, Duration::from_millis(1));
        assert_eq!(c.answers()[0], AnswerSlot::Incorrect);

        advance(&mut c, resolve_delay());
        let timeouts = c
            .drain_notices()
            .into_iter()
            .filter(|n| matches!(n, SessionNotice::AnswerRecorded { index: 0, timed_out: true, .. }))
            .count();
        assert_eq!(timeouts, 1);
        assert_eq!(c.current_index(), 1);
        assert_eq!(c.clock().remaining_secs(), 30);
    }

    #[test]
    fn disabled_timer_never_ticks() {
        let settings = QuizSettings {
            timer_enabled: false,
            ..QuizSettings::default()
        };
        let mut c = controller_with(settings);
        c.start_session(EMAIL).unwrap();
        advance(&mut c, Duration::from_secs(600));

        assert_eq!(c.answers()[0], AnswerSlot::Unanswered);
        assert!(!c.scheduler().is_pending(TimerSlot::QuestionClock));
        assert_eq!(c.view().time_remaining, None);
    }

    #[test]
    fn answering_stops_the_clock() {
        let mut c = controller();
        c.start_session(EMAIL).unwrap();
        advance(&mut c, Duration::from_secs(3));
        c.submit_answer(CORRECT);

        assert!(!c.clock().is_running());
        assert!(!c.scheduler().is_pending(TimerSlot::QuestionClock));
        assert_eq!(c.clock().remaining_secs(), 177);
    }

    #[test]
    fn stale_wake_is_ignored() {
        let mut c = controller();
        c.start_session(EMAIL).unwrap();
        let stale = Wake {
            slot: TimerSlot::QuestionClock,
            generation: 1,
            kind: WakeKind::ClockTick,
        };
        c.submit_answer(CORRECT);

        assert_eq!(c.handle_wake(stale), ActionOutcome::Ignored);
        assert_eq!(c.answers()[0], AnswerSlot::Correct);
    }

    #[test]
    fn answer_log_has_fixed_length_throughout() {
        let mut c = controller();
        assert_eq!(c.answers().len(), 10);
        c.start_session(EMAIL).unwrap();
        for i in 0..10 {
            assert_eq!(c.answers().len(), 10);
            c.submit_answer(if i % 2 == 0 { CORRECT } else { WRONG });
            advance(&mut c, resolve_delay());
        }
        assert_eq!(c.answers().len(), 10);
        assert!(!c.answers().contains(&AnswerSlot::Unanswered));
        assert_eq!(c.score(), 5);
    }

    #[test]
    fn actions_outside_their_state_are_ignored() {
        let mut c = controller();
        assert_eq!(c.submit_answer(CORRECT), ActionOutcome::Ignored);
        assert_eq!(c.finalize_session(), ActionOutcome::Ignored);
        assert_eq!(c.restart_session(None), ActionOutcome::Ignored);

        c.start_session(EMAIL).unwrap();
        assert_eq!(c.start_session(EMAIL).unwrap(), ActionOutcome::Ignored);
        assert_eq!(c.finalize_session(), ActionOutcome::Ignored);
        assert_eq!(c.submit_answer(Some(4)), ActionOutcome::Ignored);
        assert_eq!(c.state(), SessionState::Playing);
    }

    #[test]
    fn feedback_carries_explanation_and_citation_of_the_right_answer() {
        let mut c = controller();
        c.start_session(EMAIL).unwrap();
        let question = c.questions()[0].clone();
        c.submit_answer(WRONG);
        advance(&mut c, Pacing::default().feedback_delay);

        let feedback = c.transcript().last().unwrap();
        assert_eq!(feedback.is_correct, Some(false));
        assert!(feedback.content.contains(&question.correct_alternative().explanation));
        assert!(feedback.content.contains(&question.correct_alternative().citation));
    }

    #[test]
    fn restart_while_playing_cancels_pending_work() {
        let mut c = controller();
        c.start_session(EMAIL).unwrap();
        c.submit_answer(CORRECT);
        assert_eq!(c.restart_session(None), ActionOutcome::Applied);

        assert!(!c.scheduler().is_pending(TimerSlot::Feedback));
        assert!(!c.scheduler().is_pending(TimerSlot::QuestionClock));
        advance(&mut c, Duration::from_secs(5));
        assert_eq!(c.state(), SessionState::Idle);
        assert_eq!(c.transcript().len(), 1);
        assert!(completed(&c.drain_notices()).is_empty());
    }

    #[test]
    fn progressive_ordering_groups_by_difficulty() {
        let mut c = controller();
        c.start_session(EMAIL).unwrap();
        let difficulties: Vec<_> = c.questions().iter().map(|q| q.difficulty).collect();
        let mut sorted = difficulties.clone();
        sorted.sort();
        assert_eq!(difficulties, sorted);
    }

    #[test]
    fn messages_settle_after_choreography() {
        let mut c = controller();
        c.start_session(EMAIL).unwrap();
        let question = c.transcript().last().unwrap();
        assert!(question.is_typing);

        advance(&mut c, Duration::from_secs(10));
        let question = c.transcript().last().unwrap();
        assert!(question.is_settled());
        assert_eq!(question.visible_content(), question.content);
        assert!(c.options_visible());
    }

    #[test]
    fn appending_settles_the_active_message_immediately() {
        let mut c = controller();
        c.start_session(EMAIL).unwrap();
        c.submit_answer(CORRECT);

        let messages = c.transcript().messages();
        let question = &messages[messages.len() - 2];
        assert!(question.is_settled());
        assert!(!question.is_typing && !question.is_streaming);
    }

    #[test]
    fn free_text_gets_a_state_dependent_reply() {
        let mut c = controller();
        assert_eq!(c.send_text("   "), ActionOutcome::Ignored);
        assert_eq!(c.send_text("hello"), ActionOutcome::Applied);
        advance(&mut c, Pacing::default().feedback_delay);
        assert_eq!(c.transcript().last().unwrap().content, script::REPLY_IDLE);
        assert_eq!(c.state(), SessionState::Idle);
    }

    #[test]
    fn empty_pool_rejects_start() {
        let catalog = QuizCatalog::new(Vec::new(), TierTable::builtin(), QuizSettings::default());
        let mut c = QuizController::new(
            catalog,
            ManualScheduler::new(),
            Box::new(StdRng::seed_from_u64(1)),
            Pacing::default(),
        );
        assert_matches!(c.start_session(EMAIL), Err(CoreError::Validation(_)));
        assert_eq!(c.state(), SessionState::Idle);
    }

    #[test]
    fn shortage_shrinks_the_session() {
        let catalog = QuizCatalog::new(pool(1, 4, 3), TierTable::builtin(), QuizSettings::default());
        let mut c = QuizController::new(
            catalog,
            ManualScheduler::new(),
            Box::new(StdRng::seed_from_u64(3)),
            Pacing::default(),
        );
        c.start_session(EMAIL).unwrap();
        assert_eq!(c.total_questions(), 8);
        assert_eq!(c.shortages().len(), 1);
    }

    #[test]
    fn duration_is_measured_from_start() {
        let mut c = controller();
        c.start_session(EMAIL).unwrap();
        advance(&mut c, Duration::from_secs(20));
        for _ in 0..10 {
            c.submit_answer(CORRECT);
            advance(&mut c, resolve_delay());
        }
        let notices = c.drain_notices();
        let result = completed(&notices)[0];
        // 20s of thinking plus ten feedback/advance rounds of 1.3s.
        assert_eq!(result.duration_seconds, 33);
    }
}
