//! The host-facing invocation entry point.

use super::guards::{Attachment, ExitTrace};
use super::HandlerConfig;
use crate::context::{attach, RuntimeContext, TracePolicyScope};
use crate::core::{Record, SharedRecord};
use crate::errors::{ConfigurationError, PluginFault, RecordflowError};
use crate::host::{HostExecutionContext, HostInvocation};
use crate::merge::merge_pre_image;
use crate::pipeline::RuleRegistry;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, error, info, info_span};
use uuid::Uuid;

/// How an invocation ended when it did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InvocationOutcome {
    /// Every rule in the selected pipeline ran.
    Completed,
    /// No pipeline is registered for the record type and message.
    Skipped,
}

/// Summary of a successful invocation.
#[derive(Debug, Clone, Serialize)]
pub struct InvocationReport {
    /// Correlation id of the invocation.
    pub correlation_id: Uuid,
    /// Whether rules ran.
    pub outcome: InvocationOutcome,
    /// Name of the pipeline that ran.
    pub pipeline: Option<String>,
    /// Rules that ran, in order.
    pub executed_rules: Vec<String>,
    /// The record as the last rule returned it.
    pub record: Record,
    /// Number of attributes filled in from the pre-image.
    pub copied_from_pre_image: usize,
}

/// Runs rule pipelines for host invocations.
///
/// One handler is registered per plugin step; it is immutable and may serve
/// concurrent invocations.
#[derive(Debug, Clone)]
pub struct InvocationHandler {
    name: String,
    config: HandlerConfig,
    registry: RuleRegistry,
}

impl InvocationHandler {
    /// Creates a handler.
    #[must_use]
    pub fn new(name: impl Into<String>, config: HandlerConfig, registry: RuleRegistry) -> Self {
        Self {
            name: name.into(),
            config,
            registry,
        }
    }

    /// Returns the handler name used in entry and exit traces.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &HandlerConfig {
        &self.config
    }

    /// Returns the rule registry.
    #[must_use]
    pub fn registry(&self) -> &RuleRegistry {
        &self.registry
    }

    /// Handles one host invocation.
    ///
    /// Once the runtime context is built, an entry trace is written and an
    /// exit trace is guaranteed on every return path.
    ///
    /// # Errors
    ///
    /// - `ConfigurationError` if host services, the target or the pre-image
    ///   are missing. Missing services fail before any trace is written.
    /// - `DomainValidationError` or `MissingContextError` from a rule.
    /// - `PluginFault` wrapping a `HostCommunicationFault` from a rule.
    pub fn execute(&self, host: &HostInvocation) -> Result<InvocationReport, RecordflowError> {
        let execution = host
            .execution()
            .ok_or_else(|| ConfigurationError::missing_service("execution context"))?;
        let context = Arc::new(RuntimeContext::from_host(host)?);
        let metadata = context.metadata().clone();

        let span = info_span!(
            "invocation",
            handler = %self.name,
            correlation_id = %metadata.correlation_id,
            message = %metadata.message_name,
            entity = %metadata.primary_entity_name,
            stage = %metadata.stage,
        );
        let _entered = span.enter();
        let _policy = TracePolicyScope::enter(self.config.trace_policy);

        context.trace(&format!(
            "Entered {}.execute() Correlation Id: {}, Initiating User: {}",
            self.name, metadata.correlation_id, metadata.initiating_user_id
        ));
        let _exit = ExitTrace::new(&self.name, Arc::clone(&context));

        match self.run(execution, &context) {
            Err(RecordflowError::HostCommunication(fault)) => {
                context.trace(&format!("Exception: {fault}"));
                error!(operation = %fault.operation, error = %fault, "Host call failed");
                Err(PluginFault::from_host_fault(fault).into())
            }
            Err(err) => {
                context.trace(&format!("Exception: {err}"));
                Err(err)
            }
            ok => ok,
        }
    }

    fn run(
        &self,
        execution: &HostExecutionContext,
        context: &Arc<RuntimeContext>,
    ) -> Result<InvocationReport, RecordflowError> {
        let metadata = context.metadata();
        let target = &self.config.target_parameter;

        let mut post = execution
            .input(target)
            .ok_or_else(|| ConfigurationError::missing_parameter(target.as_str()))?
            .as_record()
            .ok_or_else(|| ConfigurationError::parameter_not_record(target.as_str()))?
            .clone();

        let pre = match &self.config.pre_image {
            Some(name) => Some(
                execution
                    .pre_image(name)
                    .ok_or_else(|| ConfigurationError::missing_image(name.as_str()))?,
            ),
            None => None,
        };

        let Some(pipeline) = self.registry.resolve(&post.logical_name, &metadata.message_name) else {
            context.trace(&format!(
                "No rules registered for {}.{}, skipping",
                post.logical_name, metadata.message_name
            ));
            info!(entity = %post.logical_name, "No pipeline registered");
            return Ok(InvocationReport {
                correlation_id: metadata.correlation_id,
                outcome: InvocationOutcome::Skipped,
                pipeline: None,
                executed_rules: Vec::new(),
                record: post,
                copied_from_pre_image: 0,
            });
        };

        context.trace("Merge pre image");
        let before = post.len();
        merge_pre_image(&mut post, pre);
        let copied = post.len() - before;
        debug!(copied, "Merged pre image");

        let record = SharedRecord::new(post);
        attach(Some(&record), Some(Arc::clone(context)))?;
        let _attachment = Attachment::new(record.clone());
        debug!(pipeline = pipeline.name(), "Attached runtime context");

        let run = pipeline.run(record)?;
        info!(
            pipeline = pipeline.name(),
            rules = run.executed.len(),
            "Pipeline completed"
        );

        Ok(InvocationReport {
            correlation_id: metadata.correlation_id,
            outcome: InvocationOutcome::Completed,
            pipeline: Some(pipeline.name().to_string()),
            executed_rules: run.executed,
            record: run.record.snapshot(),
            copied_from_pre_image: copied,
        })
    }
}
