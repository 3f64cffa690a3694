use std::sync::Once;

use chrono::{TimeZone, Utc};
use feedpress_core::{
    update, ArticleStatus, Effect, EntryOutcome, Fingerprint, Msg, PublishableArticle, RunLimits,
    RunState,
};
use pretty_assertions::assert_eq;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(feedpress_logging::initialize_for_tests);
}

fn article(slug: &str) -> Box<PublishableArticle> {
    let now = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
    Box::new(PublishableArticle {
        title: slug.to_uppercase(),
        slug: slug.to_string(),
        excerpt: String::new(),
        content: "<p>x</p>".to_string(),
        category: "tech".to_string(),
        tags: Vec::new(),
        thumbnail: String::new(),
        source_url: format!("https://src/{slug}"),
        source_name: "Src".to_string(),
        author: "Desk".to_string(),
        status: ArticleStatus::Published,
        created_at: now,
        updated_at: now,
        published_at: now,
        views: 0,
    })
}

fn finish(state: RunState, link: &str, outcome: EntryOutcome) -> (RunState, Vec<Effect>) {
    update(
        state,
        Msg::EntryFinished {
            fingerprint: Fingerprint::of_link(link),
            outcome,
        },
    )
}

#[test]
fn published_entry_appends_records_and_flushes_in_order() {
    init_logging();
    let (state, _) = update(
        RunState::new(RunLimits::default()),
        Msg::SourceStarted { name: "Src".into() },
    );
    let (state, effects) = finish(state, "https://src/a1", EntryOutcome::Published(article("a1")));

    assert_eq!(
        effects,
        vec![
            Effect::AppendOutput(article("a1")),
            Effect::RecordFingerprint(Fingerprint::of_link("https://src/a1")),
            Effect::FlushLedger,
        ]
    );
    assert_eq!(state.summary().published, 1);
    assert_eq!(state.current_source(), Some("Src"));
}

#[test]
fn duplicate_slug_records_without_output() {
    init_logging();
    let state = RunState::new(RunLimits::default());
    let (state, effects) = finish(
        state,
        "https://src/dup",
        EntryOutcome::DuplicateSlug { slug: "dup".into() },
    );
    assert_eq!(
        effects,
        vec![
            Effect::RecordFingerprint(Fingerprint::of_link("https://src/dup")),
            Effect::FlushLedger,
        ]
    );
    assert_eq!(state.summary().duplicates, 1);
    assert_eq!(state.summary().articles(), 0);
}

#[test]
fn store_failure_keeps_output_and_records() {
    init_logging();
    let (_, effects) = finish(
        RunState::new(RunLimits::default()),
        "https://src/s",
        EntryOutcome::StoreFailed(article("s")),
    );
    assert_eq!(effects.len(), 3);
    assert_eq!(effects[0], Effect::AppendOutput(article("s")));
}

#[test]
fn retryable_failures_leave_ledger_untouched() {
    init_logging();
    let mut state = RunState::new(RunLimits::default());
    for outcome in [
        EntryOutcome::FetchFailed,
        EntryOutcome::ExtractionFailed,
        EntryOutcome::RewriteFailed,
    ] {
        assert!(!outcome.is_terminal());
        let (next, effects) = finish(state, "https://src/retry", outcome);
        assert!(effects.is_empty());
        state = next;
    }
    assert_eq!(state.summary().retryable_failures, 3);
}

#[test]
fn per_source_cap_resets_on_next_source() {
    init_logging();
    let limits = RunLimits {
        per_source: 2,
        per_run: 3,
    };
    let (mut state, _) = update(RunState::new(limits), Msg::SourceStarted { name: "A".into() });
    for slug in ["a1", "a2"] {
        assert!(state.source_has_capacity());
        state = finish(state, slug, EntryOutcome::Saved(article(slug))).0;
    }
    assert!(!state.source_has_capacity());
    assert!(state.run_has_capacity());

    let (state, _) = update(state, Msg::SourceStarted { name: "B".into() });
    assert!(state.source_has_capacity());
    let (state, _) = finish(state, "b1", EntryOutcome::Published(article("b1")));
    assert!(!state.run_has_capacity());
    assert!(!state.source_has_capacity());
}

#[test]
fn every_finished_entry_consumes_caps_but_skips_do_not() {
    init_logging();
    let limits = RunLimits {
        per_source: 2,
        per_run: 3,
    };
    let (state, _) = update(RunState::new(limits), Msg::SourceStarted { name: "A".into() });
    let (state, _) = update(
        state,
        Msg::EntrySkipped {
            fingerprint: Fingerprint::of_link("s"),
        },
    );
    assert!(state.source_has_capacity());
    assert_eq!(state.summary().skipped, 1);

    let (state, _) = finish(state, "d", EntryOutcome::DuplicateSlug { slug: "d".into() });
    let (state, _) = finish(state, "f", EntryOutcome::RewriteFailed);
    assert!(!state.source_has_capacity());
    assert_eq!(state.summary().attempted(), 2);
    assert_eq!(state.summary().articles(), 0);

    let (state, _) = update(state, Msg::SourceStarted { name: "B".into() });
    let (state, _) = finish(state, "g", EntryOutcome::FetchFailed);
    assert!(!state.run_has_capacity());
}
