pub mod admin;
pub mod ask;
pub mod hello;
pub mod search;
pub mod stats;
pub mod suggest;

use crate::Data;

/// Every slash command the bot registers.
pub fn all() -> Vec<poise::Command<Data, crate::Error>> {
    vec![
        hello::hallo(),
        search::suche(),
        ask::frage(),
        suggest::kanalvorschlag(),
        stats::stats(),
        admin::clear(),
        admin::migrate(),
        admin::sync(),
    ]
}
