use std::sync::Arc;

use kasa_ledger::LedgerStore;
use kasa_reporting::{
    DEFAULT_RANKING_SIZE, DisplayNameResolver, encode_csv, personal, ranking, summary,
};
use kasa_types::{ContractType, Result};

use crate::response::{IgnoreReason, Response};
use crate::trigger::Trigger;

/// Routes triggers to the ledger and the reporting views.
pub struct Dispatcher {
    ledger: Arc<LedgerStore>,
    resolver: Arc<dyn DisplayNameResolver>,
    ranking_size: usize,
    self_id: Option<String>,
}

impl Dispatcher {
    pub fn new(ledger: Arc<LedgerStore>, resolver: Arc<dyn DisplayNameResolver>) -> Self {
        Self {
            ledger,
            resolver,
            ranking_size: DEFAULT_RANKING_SIZE,
            self_id: None,
        }
    }

    pub fn with_ranking_size(mut self, ranking_size: usize) -> Self {
        self.ranking_size = ranking_size;
        self
    }

    /// Ignore reactions made by this user id (the bot's own account).
    pub fn with_self_id(mut self, self_id: impl Into<String>) -> Self {
        self.self_id = Some(self_id.into());
        self
    }

    pub fn ledger(&self) -> &Arc<LedgerStore> {
        &self.ledger
    }

    pub fn resolver(&self) -> &Arc<dyn DisplayNameResolver> {
        &self.resolver
    }

    pub async fn dispatch(&self, trigger: Trigger) -> Result<Response> {
        tracing::debug!(?trigger, mutation = trigger.is_mutation(), "Dispatching trigger");
        match trigger {
            Trigger::RegisterContract {
                caller_id,
                contract,
            } => self.accrue(&caller_id, contract).await,

            Trigger::Reaction { reactor_id, marker } => {
                if self.self_id.as_deref() == Some(reactor_id.as_str()) {
                    return Ok(Response::Ignored {
                        reason: IgnoreReason::SelfReaction,
                    });
                }
                match ContractType::from_marker(&marker) {
                    Some(contract) => self.accrue(&reactor_id, contract).await,
                    None => {
                        tracing::debug!(%reactor_id, %marker, "Ignoring non-contract reaction");
                        Ok(Response::Ignored {
                            reason: IgnoreReason::UnknownMarker,
                        })
                    }
                }
            }

            Trigger::ShowAll => {
                let snapshot = self.ledger.snapshot().await;
                if snapshot.is_empty() {
                    return Ok(Response::EmptyLedger);
                }
                Ok(Response::Summary {
                    rows: summary(&snapshot, self.resolver.as_ref()),
                })
            }

            Trigger::ShowTop => {
                let snapshot = self.ledger.snapshot().await;
                Ok(Response::Ranking {
                    rows: ranking(&snapshot, self.resolver.as_ref(), self.ranking_size),
                })
            }

            Trigger::Export => {
                let snapshot = self.ledger.snapshot().await;
                Ok(Response::Export {
                    csv: encode_csv(&snapshot, self.resolver.as_ref()).await?,
                })
            }

            Trigger::ShowMine { caller_id } => {
                let snapshot = self.ledger.snapshot().await;
                Ok(match personal(&snapshot, &caller_id) {
                    Some(record) => Response::Personal { record },
                    None => Response::NoRecord { user_id: caller_id },
                })
            }

            Trigger::Reset => {
                self.ledger.reset().await?;
                Ok(Response::ResetDone)
            }
        }
    }

    async fn accrue(&self, user_id: &str, contract: ContractType) -> Result<Response> {
        let record = self.ledger.accrue(user_id, contract).await?;
        Ok(Response::Accrued {
            record,
            contract,
            bonus: self.ledger.bonus_rule().bonus(contract),
        })
    }
}
