use runtime_bridge_core::{cleanup_registered, install_registered, registered_extension};

#[test]
fn entry_points_fail_without_registered_extension() {
    assert!(registered_extension().is_none());
    assert!(!install_registered(0x40_0000));
    assert!(!cleanup_registered(0x40_0000));
    assert!(!install_registered(0));
}
