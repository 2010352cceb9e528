use std::io::Write;
use std::path::Path;

use dslab_lambda::config::{Config, ConfigParamResolvers, MemoryFootprint};
use dslab_lambda::error::SchedulingError;
use dslab_lambda::placement::{default_placement_policy_resolver, ModuloHashPolicy, PlacementPolicy};

const CONFIG: &str = r#"
warm_window: 5.0
cold_start_duration: 2.5
warm_start_duration: 0.5
memory_footprint:
  fraction: 0.4
placement_policy: RoundRobin
workers:
  - total_memory: 512
    count: 3
  - total_memory: 2048
    cpu_capacity: 4000
"#;

#[test]
fn test_yaml_config() {
    let config = Config::from_yaml_str(CONFIG, &Default::default()).unwrap();
    assert_eq!(config.warm_window, 5.0);
    assert_eq!(config.cold_start_duration, 2.5);
    assert_eq!(config.warm_start_duration, 0.5);
    assert_eq!(config.memory_footprint, MemoryFootprint::Fraction(0.4));
    assert_eq!(config.placement_policy.name(), "RoundRobin");
    assert_eq!(config.workers.len(), 4);
    let pool = config.worker_pool().unwrap();
    assert_eq!(pool.ids().collect::<Vec<_>>(), vec![0, 1, 2, 3]);
    assert_eq!(pool.find(3).unwrap().total_memory, 2048);
    assert_eq!(pool.find(3).unwrap().cpu_capacity, 4000);
    assert_eq!(pool.find(0).unwrap().cpu_capacity, 1000);
}

#[test]
fn test_defaults() {
    let config = Config::from_yaml_str("workers: [{total_memory: 512}]", &Default::default()).unwrap();
    assert_eq!(config.warm_window, 300.0);
    assert_eq!(config.memory_footprint, MemoryFootprint::Fixed(128));
    assert_eq!(config.placement_policy.name(), "ModuloHash");
}

#[test]
fn test_invalid_configs() {
    let resolvers = ConfigParamResolvers::default();
    assert!(matches!(
        Config::from_yaml_str("placement_policy: Random", &resolvers),
        Err(SchedulingError::UnknownPlacementPolicy(_))
    ));
    assert!(matches!(
        Config::from_yaml_str("warm_window: -1.0", &resolvers),
        Err(SchedulingError::InvalidConfig(_))
    ));
    assert!(matches!(
        Config::from_yaml_str("memory_footprint: {fraction: 1.5}", &resolvers),
        Err(SchedulingError::InvalidConfig(_))
    ));
    assert!(matches!(
        Config::from_yaml_str("warm_window: [1, 2]", &resolvers),
        Err(SchedulingError::Yaml(_))
    ));
    assert!(matches!(
        Config::from_yaml(Path::new("/nonexistent/lambda.yaml"), &resolvers),
        Err(SchedulingError::Io(_))
    ));
}

#[test]
fn test_custom_resolver() {
    let resolvers = ConfigParamResolvers {
        placement_policy_resolver: Box::new(|s: &str| -> Result<Box<dyn PlacementPolicy>, SchedulingError> {
            if s == "Sticky" {
                Ok(Box::new(ModuloHashPolicy {}))
            } else {
                default_placement_policy_resolver(s)
            }
        }),
    };
    let config = Config::from_yaml_str("placement_policy: Sticky", &resolvers).unwrap();
    assert_eq!(config.placement_policy.name(), "ModuloHash");
}

#[test]
fn test_yaml_file() {
    let path = std::env::temp_dir().join(format!("dslab-lambda-config-{}.yaml", std::process::id()));
    {
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(CONFIG.as_bytes()).unwrap();
    }
    let config = Config::from_yaml(&path, &Default::default()).unwrap();
    std::fs::remove_file(&path).unwrap();
    assert_eq!(config.workers.len(), 4);
}
