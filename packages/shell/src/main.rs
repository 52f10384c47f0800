use clap::Parser;
use timetrack_shell::{App, Cli, ShellError};

async fn run(cli: Cli) -> Result<String, ShellError> {
    let config = cli.config();
    tracing::debug!(api_url = %config.api_url, "starting");
    let mut app = App::connect(&config)?;
    app.run(cli.command()).await
}

fn main() {
    let cli = Cli::parse();
    timetrack_shell::init_tracing();

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    match runtime.block_on(run(cli)) {
        Ok(screen) => println!("{}", screen),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
