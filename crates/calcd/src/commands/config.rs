use calc_core::CalcConfig;

/// Print the effective configuration, every default filled in.
pub fn print(config: &CalcConfig) -> anyhow::Result<()> {
    print!("{}", effective(config)?.to_toml_string()?);
    Ok(())
}

fn effective(config: &CalcConfig) -> anyhow::Result<CalcConfig> {
    let mut resolved = CalcConfig::scaffold()
        .with_bind(config.bind_addr()?.to_string())
        .with_health_echo(config.health_echo())
        .with_max_body_bytes(config.max_body_bytes());
    if let Some(log) = resolved.log.as_mut() {
        log.filter = Some(config.log_filter().to_string());
    }
    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn effective_fills_defaults() {
        let resolved = effective(&CalcConfig::default()).unwrap();
        assert_eq!(resolved, CalcConfig::scaffold());
    }

    #[test]
    fn effective_keeps_overrides() {
        let config = CalcConfig::default()
            .with_bind("0.0.0.0:7000")
            .with_health_echo(true)
            .with_max_body_bytes(1024);
        let toml_str = effective(&config).unwrap().to_toml_string().unwrap();
        assert!(toml_str.contains("0.0.0.0:7000"));
        assert!(toml_str.contains("health_echo = true"));
        assert!(toml_str.contains("max_body_bytes = 1024"));
    }
}
