use std::sync::Arc;

use log::error;

use bedrock_adapter::{server, Adapter, AdapterConfig};

#[tokio::main]
async fn main()
{   env_logger::init();

    let config = match AdapterConfig::from_env()
    {   Ok(c) => c
      , Err(e) => {
          error!("{}", e);
          std::process::exit(1);
        }
    };

    let adapter = Arc::new(Adapter::from_config(&config));
    if let Err(e) = server::serve(adapter, config.port).await
    {   error!("{}", e);
        std::process::exit(1);
    }
}
