use crate::{Fingerprint, PublishableArticle};

/// Side effects requested by [`crate::update`], executed by the run loop in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    AppendOutput(Box<PublishableArticle>),
    RecordFingerprint(Fingerprint),
    FlushLedger,
}
