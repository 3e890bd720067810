fn main() {
    // Host builds (tests, proptest, fuzz) need no ESP-IDF environment.
    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
