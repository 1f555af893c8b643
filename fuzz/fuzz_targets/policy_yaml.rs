#![no_main]

use libfuzzer_sys::fuzz_target;
use pacm::policy::load_policy;

fuzz_target!(|data: &str| {
    // Arbitrary text must produce a policy or a schema error, never a panic.
    if let Ok(policy) = load_policy(data) {
        // Anything accepted must survive a reload unchanged.
        let yaml = policy.to_yaml().expect("serialize accepted policy");
        let reloaded = load_policy(&yaml).expect("reload accepted policy");
        assert_eq!(policy, reloaded);
    }
});
