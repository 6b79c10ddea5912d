//! # Payload Processor
//!
//! Decode → parse → upsert. Each external call runs under the caller's
//! `Context`, so a stuck parser or store gives up at the delivery's deadline.

use crate::domain::entities::ParsedVaaRecord;
use crate::domain::errors::{ParserError, ProcessError};
use crate::ports::outbound::{ParsedVaaRepository, PayloadParser};
use chrono::Utc;
use shared_types::{Context, Vaa};
use std::sync::Arc;
use tracing::{error, info, warn};

pub struct PayloadProcessor {
    parser: Arc<dyn PayloadParser>,
    repository: Arc<dyn ParsedVaaRepository>,
}

impl PayloadProcessor {
    pub fn new(parser: Arc<dyn PayloadParser>, repository: Arc<dyn ParsedVaaRepository>) -> Self {
        Self { parser, repository }
    }

    /// Decode `raw` and process it.
    pub async fn process(
        &self,
        ctx: &Context,
        raw: &[u8],
    ) -> Result<Option<ParsedVaaRecord>, ProcessError> {
        let vaa = Vaa::decode(raw)?;
        self.process_vaa(ctx, &vaa).await
    }

    /// Parse an already-decoded VAA and upsert the result.
    ///
    /// Returns `Ok(None)` when the parser does not understand the payload;
    /// nothing is written in that case.
    pub async fn process_vaa(
        &self,
        ctx: &Context,
        vaa: &Vaa,
    ) -> Result<Option<ParsedVaaRecord>, ProcessError> {
        let parsed = match ctx
            .run(self.parser.parse(
                vaa.emitter_chain,
                &vaa.emitter_address,
                vaa.sequence,
                &vaa.payload,
            ))
            .await?
        {
            Ok(parsed) => parsed,
            Err(ParserError::Unparseable(reason)) => {
                info!(
                    chain = %vaa.emitter_chain,
                    address = %vaa.emitter_address,
                    sequence = vaa.sequence,
                    reason = %reason,
                    "VAA cannot be parsed"
                );
                return Ok(None);
            }
            Err(e) => {
                warn!(message_id = %vaa.message_id(), error = %e, "Parser call failed");
                return Err(ProcessError::Parser(e));
            }
        };

        let record = ParsedVaaRecord::new(vaa, parsed, Utc::now());

        if let Err(e) = ctx.run(self.repository.upsert_parsed_vaa(&record)).await? {
            error!(id = %record.id, error = %e, "Error inserting VAA in repository");
            return Err(e.into());
        }

        info!(id = %record.id, app_id = %record.app_id, "Parsed VAA persisted");
        Ok(Some(record))
    }
}
