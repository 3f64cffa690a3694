use crate::{Effect, Msg, RunState};

/// Pure update function: applies a message to state and returns any effects.
///
/// Terminal outcomes append their article (if any), record the fingerprint and
/// flush the ledger immediately, so a crash loses at most the entry in flight.
/// Retryable outcomes leave the ledger untouched.
pub fn update(mut state: RunState, msg: Msg) -> (RunState, Vec<Effect>) {
    let effects = match msg {
        Msg::SourceStarted { name } => {
            state.start_source(name);
            Vec::new()
        }
        Msg::EntrySkipped { .. } => {
            state.note_skip();
            Vec::new()
        }
        Msg::EntryFinished {
            fingerprint,
            outcome,
        } => {
            state.note_outcome(&outcome);
            if outcome.is_terminal() {
                let mut effects = Vec::with_capacity(3);
                if let Some(article) = outcome.output() {
                    effects.push(Effect::AppendOutput(Box::new(article.clone())));
                }
                effects.push(Effect::RecordFingerprint(fingerprint));
                effects.push(Effect::FlushLedger);
                effects
            } else {
                Vec::new()
            }
        }
    };

    (state, effects)
}
