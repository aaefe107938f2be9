use anyhow::Result;

fn main() -> Result<()> {
    rookery::protocol::run()
}
