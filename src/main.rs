fn main() {
    mattaview_lib::run()
}
