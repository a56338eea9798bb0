use crate::envelope::Ttl;

const SWEEP_INTERVAL: &str = "SWEEP_INTERVAL";

/// Sweep interval override in seconds, if set and valid
pub fn get_sweep_interval() -> Option<u64> {
    let interval_from_env = std::env::var(SWEEP_INTERVAL);
    interval_from_env.ok().and_then(|res| res.parse().ok())
}

const HOST_TTL: &str = "HOST_TTL";

/// Default host ttl override in seconds, if set and valid
pub fn get_host_ttl() -> Option<Ttl> {
    let ttl_from_env = std::env::var(HOST_TTL);
    ttl_from_env
        .ok()
        .and_then(|res| res.parse().ok())
        .map(Ttl::from_secs)
}

const CONFIG_FILE: &str = "CLUSTER_CACHE_CONFIG";

pub fn get_config_file() -> Option<String> {
    std::env::var(CONFIG_FILE).ok()
}
