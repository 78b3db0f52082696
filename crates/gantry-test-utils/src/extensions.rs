//! Canned build extensions with known behavior.

use gantry_engine::{BuildConfiguration, LogEvent, LogSink};
use gantry_extensions::{BuildExtension, ExtensionContext, ExtensionError};

/// Appends its `suffix` property to the `chain` label, creating the label
/// on first use. Configuring it twice makes pipeline ordering observable.
pub struct LabelChainExtension;

impl BuildExtension for LabelChainExtension {
    fn extend(
        &self,
        configuration: BuildConfiguration,
        context: &ExtensionContext<'_>,
        log: &dyn LogSink,
    ) -> Result<BuildConfiguration, ExtensionError> {
        let suffix = context.property("suffix").unwrap_or("!");
        let chained = match configuration.labels().get("chain") {
            Some(existing) => format!("{existing}{suffix}"),
            None => suffix.to_string(),
        };
        log.accept(LogEvent::debug(format!("chain label is now '{chained}'")));
        Ok(configuration.with_label("chain", chained))
    }
}

/// Always fails. The message comes from the `message` property when set.
pub struct FailingExtension;

impl BuildExtension for FailingExtension {
    fn extend(
        &self,
        _configuration: BuildConfiguration,
        context: &ExtensionContext<'_>,
        _log: &dyn LogSink,
    ) -> Result<BuildConfiguration, ExtensionError> {
        let message = context
            .property("message")
            .unwrap_or("extension refused the configuration");
        Err(ExtensionError::message(message))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use gantry_engine::{ImageReference, NullSink};
    use gantry_host::{Session, Workspace};

    use super::*;

    #[test]
    fn test_label_chain_appends_in_order() {
        let mut ws = Workspace::new(Session::new("0.0.0"));
        let id = ws.create_project("app", "/ws/app");
        let configuration =
            BuildConfiguration::from_base(ImageReference::parse("alpine:3.20").unwrap());

        let first: BTreeMap<String, String> =
            [("suffix".to_string(), "a".to_string())].into_iter().collect();
        let second: BTreeMap<String, String> =
            [("suffix".to_string(), "b".to_string())].into_iter().collect();

        let context = ExtensionContext::new(ws.project(id), ws.session(), &first);
        let configuration = LabelChainExtension
            .extend(configuration, &context, &NullSink)
            .unwrap();
        let context = ExtensionContext::new(ws.project(id), ws.session(), &second);
        let configuration = LabelChainExtension
            .extend(configuration, &context, &NullSink)
            .unwrap();

        assert_eq!(configuration.labels()["chain"], "ab");
    }

    #[test]
    fn test_failing_extension_uses_the_message_property() {
        let mut ws = Workspace::new(Session::new("0.0.0"));
        let id = ws.create_project("app", "/ws/app");
        let configuration =
            BuildConfiguration::from_base(ImageReference::parse("alpine:3.20").unwrap());

        let properties: BTreeMap<String, String> =
            [("message".to_string(), "no thanks".to_string())]
                .into_iter()
                .collect();
        let context = ExtensionContext::new(ws.project(id), ws.session(), &properties);

        let err = FailingExtension
            .extend(configuration, &context, &NullSink)
            .unwrap_err();
        assert_eq!(err.to_string(), "no thanks");
    }
}
