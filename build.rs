fn main() {
    // Build-time JSON override for `VentConfig`, read by the firmware entry point.
    println!("cargo:rerun-if-env-changed=HOODVENT_CONFIG");

    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
