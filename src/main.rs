fn main() {
    writeflow::run();
}
