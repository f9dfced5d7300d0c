use owo_colors::OwoColorize as _;

fn main() {
  let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
    .format_timestamp_secs()
    .try_init();

  if let Err(err) = create_sea_js::run() {
    anstream::eprintln!("{}", format!("Error: {err:#}").red());
    std::process::exit(1);
  }
}
