fn main() -> anyhow::Result<()> {
    // Baked into the firmware with option_env!
    println!("cargo:rerun-if-env-changed=ENTRYGATE_CONFIG");
    println!("cargo:rerun-if-env-changed=ENTRYGATE_WIFI_CONFIG");

    embuild::build::CfgArgs::output_propagated("ESP_IDF")?;
    embuild::build::LinkArgs::output_propagated("ESP_IDF")?;
    Ok(())
}
