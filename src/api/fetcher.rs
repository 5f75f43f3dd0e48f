use super::Client;
use crate::app::Selection;
use crate::stats::{CountryStat, Summary, Timeline};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use tracing::{info, warn};

/// Result of a background request, delivered to the UI loop
#[derive(Debug)]
pub enum FetchEvent {
    Countries(Vec<CountryStat>),
    /// Summary for a selection; `country` is present for a single country
    Summary {
        selection: Selection,
        summary: Summary,
        country: Option<CountryStat>,
    },
    /// Summary request failed; carries its selection like a success does
    SummaryFailed { selection: Selection, error: String },
    History(Timeline),
    Failed { what: &'static str, error: String },
}

/// Runs API requests on the rayon pool so drawing never waits on the network
pub struct Fetcher {
    client: Arc<Client>,
    history_days: u32,
    tx: Sender<FetchEvent>,
    rx: Receiver<FetchEvent>,
}

impl Fetcher {
    pub fn new(client: Client, history_days: u32) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            client: Arc::new(client),
            history_days,
            tx,
            rx,
        }
    }

    fn spawn<F>(&self, what: &'static str, job: F)
    where
        F: FnOnce(&Client) -> anyhow::Result<FetchEvent> + Send + 'static,
    {
        let client = Arc::clone(&self.client);
        let tx = self.tx.clone();
        rayon::spawn(move || {
            let event = match job(&client) {
                Ok(event) => {
                    info!(what, "fetch complete");
                    event
                }
                Err(e) => {
                    warn!(what, error = %format!("{e:#}"), "fetch failed");
                    FetchEvent::Failed {
                        what,
                        error: format!("{e:#}"),
                    }
                }
            };
            // Receiver only goes away on shutdown
            let _ = tx.send(event);
        });
    }

    pub fn request_countries(&self) {
        self.spawn("countries", |client| client.fetch_countries().map(FetchEvent::Countries));
    }

    pub fn request_summary(&self, selection: Selection) {
        self.spawn("summary", move |client| {
            let fetched = match &selection {
                Selection::Worldwide => client.fetch_all().map(|summary| (summary, None)),
                Selection::Country(key) => client
                    .fetch_country(key)
                    .map(|country| (country.counts, Some(country))),
            };
            Ok(match fetched {
                Ok((summary, country)) => FetchEvent::Summary {
                    selection,
                    summary,
                    country,
                },
                Err(e) => {
                    warn!(?selection, error = %format!("{e:#}"), "summary fetch failed");
                    FetchEvent::SummaryFailed {
                        selection,
                        error: format!("{e:#}"),
                    }
                }
            })
        });
    }

    pub fn request_history(&self) {
        let days = self.history_days;
        self.spawn("history", move |client| client.fetch_history(days).map(FetchEvent::History));
    }

    /// Drain everything that has arrived since the last tick
    pub fn poll(&self) -> Vec<FetchEvent> {
        self.rx.try_iter().collect()
    }
}
