fn main() -> anyhow::Result<()> {
    dmclib::cli::run_cli()
}
