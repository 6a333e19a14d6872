// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `config.rs`

#[cfg(test)]
mod tests {
    use super::super::*;
    use clap::CommandFactory;

    #[test]
    fn test_defaults() {
        let args = ControllerArgs::try_parse_from(["polaris-controller"]).unwrap();

        assert_eq!(args.worker_count(), DEFAULT_WORKERS);
        assert_eq!(
            args.resync_period(),
            Some(Duration::from_secs(DEFAULT_RESYNC_PERIOD_SECS))
        );
        assert_eq!(args.watch_namespace, None);
        assert_eq!(args.metrics_addr().port(), METRICS_SERVER_PORT);
    }

    #[test]
    fn test_explicit_flags() {
        let args = ControllerArgs::try_parse_from([
            "polaris-controller",
            "--workers",
            "8",
            "--resync-period-secs",
            "0",
            "--watch-namespace",
            "ns1",
            "--metrics-address",
            "127.0.0.1",
            "--metrics-port",
            "9100",
            "--log-format",
            "json",
        ])
        .unwrap();

        assert_eq!(args.worker_count(), 8);
        assert_eq!(args.resync_period(), None);
        assert_eq!(args.watch_namespace.as_deref(), Some("ns1"));
        assert_eq!(args.metrics_addr().to_string(), "127.0.0.1:9100");
        assert_eq!(args.log_format, LogFormat::Json);
    }

    #[test]
    fn test_zero_workers_is_clamped() {
        let args = ControllerArgs::try_parse_from(["polaris-controller", "--workers", "0"]).unwrap();
        assert_eq!(args.worker_count(), 1);
    }

    #[test]
    fn test_invalid_log_format_rejected() {
        assert!(
            ControllerArgs::try_parse_from(["polaris-controller", "--log-format", "xml"]).is_err()
        );
    }

    #[test]
    fn test_help_describes_log_format() {
        let help = ControllerArgs::command().render_long_help().to_string();
        assert!(help.contains("--log-format"));
        assert!(help.contains("Log output format"));
    }
}
