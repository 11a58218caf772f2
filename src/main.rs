use sherlock_ratatui::{
    app::App,
    logging,
    prompt::PersonaTemplate,
    settings::{self, Settings},
};

use color_eyre::eyre::Result;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let data_dir = settings::data_dir()?;
    std::fs::create_dir_all(&data_dir)?;
    let settings = Settings::load(&data_dir)?;
    logging::init(&data_dir, settings.log_level())?;
    log::info!("Sherlock start: {}", chrono::Local::now());

    let persona = PersonaTemplate::load_or_create(&data_dir);
    let mut app = App::new(settings, persona, &data_dir);
    app.run().await
}
