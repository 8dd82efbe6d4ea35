fn main() {
    quill_cli::run_main();
}
