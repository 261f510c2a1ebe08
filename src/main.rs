fn main() {
    btree::cli::run();
}
