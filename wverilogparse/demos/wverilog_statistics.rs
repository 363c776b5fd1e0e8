use wverilogparse::WVerilog;
use std::env;

fn main() {
    clilog::init_stderr_color_debug();
    let args: Vec<String> = env::args().collect();
    assert!(args.len() == 2,
            "Usage: {} <verilog_path>", args[0]);
    clilog::info!("Verilog file {}", args[1]);

    let design = match WVerilog::parse_file(&args[1]) {
        Ok(design) => design,
        Err(e) => panic!("{}", e)
    };
    design.log_summary();

    clilog::info!("# Modules = {}", design.modules.len());
    clilog::info!("# Boxes = {}", design.modules.iter().map(|m| m.boxes.len())
                  .sum::<usize>());
    clilog::info!("# Names = {}", design.strs.len());
}
