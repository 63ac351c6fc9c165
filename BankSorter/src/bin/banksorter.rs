fn main() -> anyhow::Result<()> {
    banksorter::cli::run_cli()
}
