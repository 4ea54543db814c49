fn main() {
    println!("cargo:rerun-if-env-changed=CO2MON_CONFIG_JSON");

    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
