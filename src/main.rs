use colored::Colorize;

fn main() {
    let command_line_interface = nodegen::cli::CommandLineInterface::load();
    nodegen::logging::init(command_line_interface.log_level());
    if let Err(error) = command_line_interface.run() {
        eprintln!("{} {error:#}", "error:".red().bold());
        std::process::exit(1);
    }
}
