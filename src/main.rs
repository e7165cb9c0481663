use ae_interpreter::{Autoencoder, BuildConfig, GraphContext, LayerSpec};
use anyhow::{Context, Result};
use candle_core::Tensor;
use clap::{Arg, ArgAction, ArgMatches, Command};

fn main() -> Result<()> {
    env_logger::init();

    let matches = Command::new("ae_interpreter")
        .version("0.1.0")
        .about("디스크립터 기반 대칭 오토인코더 빌더")
        .subcommand_required(true)
        .subcommand(
            Command::new("parse")
                .about("디스크립터를 파싱해 레이어 명세 출력")
                .arg(
                    Arg::new("descriptor")
                        .required(true)
                        .help("레이어 디스크립터 (예: f10i-3c64r-d0.1-p2-ap2)"),
                ),
        )
        .subcommand(
            Command::new("build")
                .about("0 입력으로 오토인코더 그래프를 빌드하고 레이어별 형상 출력")
                .arg(
                    Arg::new("descriptor")
                        .required(true)
                        .help("레이어 디스크립터"),
                )
                .arg(
                    Arg::new("shape")
                        .long("shape")
                        .short('s')
                        .value_name("N,C,H,W")
                        .help("입력 텐서 형상")
                        .default_value("1,1,28,28"),
                )
                .arg(
                    Arg::new("config")
                        .long("config")
                        .short('c')
                        .value_name("FILE")
                        .help("빌드 설정 JSON 파일"),
                )
                .arg(
                    Arg::new("stacked")
                        .long("stacked")
                        .action(ArgAction::SetTrue)
                        .help("레이어별 누적 손실도 빌드"),
                ),
        )
        .get_matches();

    match matches.subcommand() {
        Some(("parse", sub)) => run_parse(sub),
        Some(("build", sub)) => run_build(sub),
        _ => unreachable!("subcommand_required"),
    }
}

fn run_parse(matches: &ArgMatches) -> Result<()> {
    let descriptor = required(matches, "descriptor")?;
    let kinds = ae_interpreter::parse_descriptor(descriptor)?;

    println!("📋 레이어 {} 개", kinds.len());
    for (index, kind) in kinds.iter().enumerate() {
        println!("  {:>2}  {:<18} {}", index + 1, kind.name(), kind);
    }
    Ok(())
}

fn run_build(matches: &ArgMatches) -> Result<()> {
    let descriptor = required(matches, "descriptor")?;
    let shape = parse_shape(required(matches, "shape")?)?;
    let config = match matches.get_one::<String>("config") {
        Some(path) => BuildConfig::from_json_file(path)?,
        None => BuildConfig::default(),
    };

    let mut ctx = GraphContext::new(config);
    let input = Tensor::zeros(shape, ctx.dtype(), &ctx.device)?;
    let mut model = Autoencoder::from_descriptor(&mut ctx, &input, descriptor)?;

    println!("✅ 빌드 완료: {}", model.descriptor());
    println!("   인코딩 형상: {:?}", model.encoded.dims());
    println!("   디코딩 형상: {:?}", model.decoded.dims());
    for (index, spec) in model.config.iter().enumerate() {
        print_spec(index, spec);
    }
    println!("   argmax 마스크: {} 개, 변수: {} 개", model.masks.len(), ctx.variable_count());

    if matches.get_flag("stacked") {
        let losses = model.build_stacked_losses(&mut ctx)?;
        println!("🔁 누적 손실 {} 개", losses.len());
        for loss in losses {
            println!("   {:.6}", loss.to_scalar::<f32>().unwrap_or(f32::NAN));
        }
    }
    Ok(())
}

fn print_spec(index: usize, spec: &LayerSpec) {
    println!(
        "  {:>2}  {:<18} in={:<20} enc={:<24} dec={}",
        index,
        spec.kind.to_string(),
        format!("{:?}", spec.shape),
        spec.encoder_scope.as_deref().unwrap_or("-"),
        spec.decoder_scope.as_deref().unwrap_or("-"),
    );
}

fn required<'a>(matches: &'a ArgMatches, name: &str) -> Result<&'a str> {
    matches
        .get_one::<String>(name)
        .map(String::as_str)
        .with_context(|| format!("인자 누락: {}", name))
}

fn parse_shape(text: &str) -> Result<Vec<usize>> {
    text.split(',')
        .map(|dim| {
            dim.trim()
                .parse::<usize>()
                .with_context(|| format!("잘못된 형상 값: {}", dim))
        })
        .collect()
}
