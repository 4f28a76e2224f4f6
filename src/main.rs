use repotags::app;

fn main() {
    let exit_code = app::startup::run();
    std::process::exit(exit_code);
}
