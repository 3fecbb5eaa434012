use log::error;

#[actix_web::main]
async fn main()
{   env_logger::init();

    let config = match autoarch::config::AppConfig::from_env()
    {   Ok(config) => config
      , Err(e) => {
          error!("{}", e);
          std::process::exit(2);
        }
    };

    if let Err(e) = autoarch::server::run(config).await
    {   error!("{}", e);
        std::process::exit(1);
    }
}
