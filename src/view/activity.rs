use std::sync::PoisonError;

use async_trait::async_trait;
use tracing::debug;

use crate::{EXIT_TYPE, RECEIVER_TYPE, Result, events::{DiagramEvent, PipeEvent}};

use super::classifier::{NodeClassifier, ResolveContext, ScaffoldStyle, is_receiver};

/// Pipes whose icon comes from the activity catalog.
///
/// Resolution fetches the catalog, asks listeners for the model's
/// attributes, then runs the two-level lookup. Exit and receiver pipes are
/// forced to the `Exit` and `Receiver` activities whatever the lookup said.
#[derive(Debug, Clone, Copy, Default)]
pub struct ActivityClassifier;

#[async_trait]
impl NodeClassifier for ActivityClassifier {
    fn scaffold_style(&self) -> ScaffoldStyle {
        ScaffoldStyle {
            rule: false,
            type_text: false,
            boxed: true,
        }
    }

    async fn resolve(
        &self,
        ctx: &ResolveContext<'_>,
    ) -> Result<Option<String>> {
        let catalog = ctx.diagram.catalog().fetch().await?;

        let name = ctx.model.read().unwrap_or_else(PoisonError::into_inner).name.clone();
        ctx.diagram.notify(DiagramEvent::GetPipeAttributes(PipeEvent {
            name,
            pipe_model: ctx.model.clone(),
        }));

        let mut model = ctx.model.write().unwrap_or_else(PoisonError::into_inner);
        let mut activity = catalog.resolve_activity(&model);
        debug!(pipe = %model.name, pipe_type = ?model.pipe_type, ?activity, "catalog lookup finished");

        if model.is_exit {
            model.pipe_type = Some(EXIT_TYPE.to_string());
            activity = Some(EXIT_TYPE.to_string());
        } else if is_receiver(&model.name, ctx.types) {
            model.pipe_type = Some(RECEIVER_TYPE.to_string());
            activity = Some(RECEIVER_TYPE.to_string());
        }

        Ok(activity)
    }
}
