use lead_config::LeadsConfig;

/// Emit warnings for env vars that look like settings but were not picked up.
pub fn warn_unconfigured(config: &LeadsConfig) {
    for warning in collect_unconfigured_warnings(config, std::env::vars()) {
        tracing::warn!("{warning}");
    }
}

struct Section {
    label: &'static str,
    prefix: &'static str,
    example: &'static str,
}

const SECTIONS: [Section; 5] = [
    Section {
        label: "Store",
        prefix: "LEADS_STORE",
        example: "LEADS_STORE__URL",
    },
    Section {
        label: "Auth",
        prefix: "LEADS_AUTH",
        example: "LEADS_AUTH__URL",
    },
    Section {
        label: "Prospect API",
        prefix: "LEADS_PROSPECT",
        example: "LEADS_PROSPECT__API_KEY",
    },
    Section {
        label: "LinkedIn finder",
        prefix: "LEADS_LINKEDIN",
        example: "LEADS_LINKEDIN__API_KEY",
    },
    Section {
        label: "Webhook",
        prefix: "LEADS_WEBHOOK",
        example: "LEADS_WEBHOOK__URL",
    },
];

/// Stored sessions travel in this variable; it is not an auth setting.
const SESSION_ENV: &str = "LEADS_AUTH__SESSION";

fn is_configured(config: &LeadsConfig, prefix: &str) -> bool {
    match prefix {
        "LEADS_STORE" => config.store.is_remote(),
        "LEADS_AUTH" => config.auth.is_configured(),
        "LEADS_PROSPECT" => config.prospect.is_configured(),
        "LEADS_LINKEDIN" => config.linkedin.is_configured(),
        "LEADS_WEBHOOK" => config.webhook.is_configured(),
        _ => true,
    }
}

fn collect_unconfigured_warnings<I>(config: &LeadsConfig, env: I) -> Vec<String>
where
    I: IntoIterator<Item = (String, String)>,
{
    let keys = env
        .into_iter()
        .map(|(key, _)| key)
        .filter(|key| key != SESSION_ENV && key.starts_with("LEADS_"))
        .collect::<Vec<_>>();

    SECTIONS
        .iter()
        .filter(|section| !is_configured(config, section.prefix))
        .filter(|section| keys.iter().any(|key| key.starts_with(section.prefix)))
        .map(|section| {
            format!(
                "{} config appears default while {}* env vars exist. Use double underscores (example: {}).",
                section.label, section.prefix, section.example
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use lead_config::{AuthConfig, LeadsConfig, WebhookConfig};

    use super::collect_unconfigured_warnings;

    fn env(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect()
    }

    #[test]
    fn warns_for_single_underscore_keys() {
        let warnings = collect_unconfigured_warnings(
            &LeadsConfig::default(),
            env(&[
                ("LEADS_PROSPECT_API_KEY", "pk"),
                ("LEADS_WEBHOOK_URL", "https://hooks.example.com/x"),
                ("LEADS_LINKEDIN__API_KEY", ""),
            ]),
        );

        assert_eq!(warnings.len(), 3);
        assert!(warnings[0].starts_with("Prospect API"));
    }

    #[test]
    fn session_variable_alone_does_not_warn() {
        let warnings = collect_unconfigured_warnings(
            &LeadsConfig::default(),
            env(&[("LEADS_AUTH__SESSION", "{}"), ("LEADS_LOG", "debug")]),
        );

        assert!(warnings.is_empty());
    }

    #[test]
    fn configured_sections_stay_quiet() {
        let config = LeadsConfig {
            auth: AuthConfig {
                url: "https://auth.example.com".to_owned(),
                anon_key: "anon".to_owned(),
            },
            webhook: WebhookConfig {
                url: "https://hooks.example.com/x".to_owned(),
            },
            ..Default::default()
        };

        let warnings = collect_unconfigured_warnings(
            &config,
            env(&[
                ("LEADS_AUTH__URL", "https://auth.example.com"),
                ("LEADS_WEBHOOK__URL", "https://hooks.example.com/x"),
            ]),
        );

        assert!(warnings.is_empty());
    }
}
