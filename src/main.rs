fn main() -> anyhow::Result<()> {
    knowledge_sync::cli::run()
}
