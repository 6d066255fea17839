//! Unit tests for configuration.

#[cfg(test)]
mod path_expansion_tests {
    use super::super::Config;
    use std::path::PathBuf;

    #[test]
    fn expand_path_handles_tilde() {
        let result = Config::expand_path("~/test");
        assert!(!result.to_string_lossy().starts_with('~'));
    }

    #[test]
    fn expand_path_handles_absolute_path() {
        let result = Config::expand_path("/absolute/path");
        assert_eq!(result, PathBuf::from("/absolute/path"));
    }

    #[test]
    fn expand_path_handles_env_vars() {
        temp_env::with_var("CHATROSPECT_TEST_VAR", Some("/test/path"), || {
            let result = Config::expand_path("$CHATROSPECT_TEST_VAR/subdir");
            assert!(result.to_string_lossy().contains("/test/path"));
        });
    }
}

#[cfg(test)]
mod default_config_tests {
    use super::super::{AnalysisConfig, Config};

    #[test]
    fn default_top_n_is_seven() {
        let config = AnalysisConfig::default();
        assert_eq!(config.top_words, 7);
        assert_eq!(config.top_emojis, 7);
    }

    #[test]
    fn default_ghosting_threshold_is_three_days() {
        let config = AnalysisConfig::default();
        assert_eq!(config.ghosting_threshold_hours, 72);
        assert_eq!(config.ghosting_threshold(), chrono::Duration::days(3));
    }

    #[test]
    fn default_normalizer_is_month_first() {
        assert!(!AnalysisConfig::default().normalizer.day_first);
    }

    #[test]
    fn default_api_port() {
        assert_eq!(Config::default().api.port, 3000);
    }

    #[test]
    fn default_config_path_ends_with_toml() {
        let path = Config::default_config_path();
        assert!(path.to_string_lossy().contains("chatrospect"));
        assert!(path.to_string_lossy().ends_with("config.toml"));
    }
}

#[cfg(test)]
mod validation_tests {
    use super::super::AnalysisConfig;

    #[test]
    fn default_is_valid() {
        assert!(AnalysisConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_zero_top_words() {
        let config = AnalysisConfig {
            top_words: 0,
            ..AnalysisConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_zero_top_emojis() {
        let config = AnalysisConfig {
            top_emojis: 0,
            ..AnalysisConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_zero_threshold() {
        let config = AnalysisConfig {
            ghosting_threshold_hours: 0,
            ..AnalysisConfig::default()
        };
        assert!(config.validate().is_err());
    }
}

#[cfg(test)]
mod loading_tests {
    use super::super::Config;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        temp_env::with_var_unset("CHATROSPECT_ANALYSIS__TOP_WORDS", || {
            let config = Config::load_from_path(&dir.path().join("absent.toml")).expect("load");
            assert_eq!(config.analysis.top_words, 7);
        });
    }

    #[test]
    fn file_values_override_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[analysis]\ntop_words = 3\nextra_stop_words = [\"lol\"]\n",
        )
        .expect("write");

        temp_env::with_var_unset("CHATROSPECT_ANALYSIS__TOP_WORDS", || {
            let config = Config::load_from_path(&path).expect("load");
            assert_eq!(config.analysis.top_words, 3);
            assert_eq!(config.analysis.top_emojis, 7);
            assert_eq!(config.analysis.extra_stop_words, vec!["lol".to_string()]);
        });
    }

    #[test]
    fn env_overrides_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[analysis]\ntop_words = 3\n").expect("write");

        temp_env::with_var("CHATROSPECT_ANALYSIS__TOP_WORDS", Some("10"), || {
            let config = Config::load_from_path(&path).expect("load");
            assert_eq!(config.analysis.top_words, 10);
        });
    }

    #[test]
    fn invalid_values_are_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[analysis]\ntop_emojis = 0\n").expect("write");

        assert!(Config::load_from_path(&path).is_err());
    }

    #[test]
    fn ensure_at_creates_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("config.toml");

        let config = Config::ensure_at(&path).expect("ensure");
        assert!(path.exists());
        assert_eq!(config.analysis.ghosting_threshold_hours, 72);
    }
}

#[cfg(test)]
mod config_serialization_tests {
    use super::super::Config;

    #[test]
    fn toml_roundtrip() {
        let mut config = Config::default();
        config.analysis.top_words = 12;
        config.analysis.extra_stop_words = vec!["haha".to_string()];
        config.analysis.normalizer.day_first = true;

        let toml_str = toml::to_string(&config).expect("serialize");
        let parsed: Config = toml::from_str(&toml_str).expect("deserialize");

        assert_eq!(parsed.analysis, config.analysis);
        assert_eq!(parsed.api.port, config.api.port);
    }
}
