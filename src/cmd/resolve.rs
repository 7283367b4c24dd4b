use booter_bootparams::BootParamsResolver;
use clap::Args;
use color_eyre::eyre::{Result, WrapErr};
use tracing::info;

#[derive(Args, Debug)]
pub struct ResolveArgs {
    /// MAC address the node boots from
    pub mac: String,

    /// Print the lookup key and overridden tags to stderr
    #[arg(long, default_value_t = false)]
    pub explain: bool,
}

pub async fn run_resolve(args: ResolveArgs, resolver: BootParamsResolver) -> Result<()> {
    let resolution = resolver
        .resolve(&args.mac)
        .await
        .wrap_err_with(|| format!("failed to resolve boot parameters for {}", args.mac))?;

    if args.explain {
        info!(
            mac = %args.mac,
            key = %resolution.lookup_key,
            fell_back = resolution.fell_back,
            provisioned = resolution.provisioned,
            overridden = ?resolution.overridden.to_vec(),
            "Resolution details"
        );
    }

    println!("{}", serde_json::to_string_pretty(&resolution.params)?);
    Ok(())
}
