//! The default capability catalog.
//!
//! One descriptor per device-automation primitive the generated programs may
//! call. Keywords are bilingual so Chinese and English requests both hit.

use genie_core::CapabilityDoc;

/// The built-in descriptors, in insertion order.
pub fn default_capabilities() -> Vec<CapabilityDoc> {
    vec![
        // ── motion ──
        CapabilityDoc::new("motion", "Click")
            .description("Tap the screen at the given coordinate")
            .signature("func Click(x, y, fingerID int)")
            .parameters("x: X coordinate, y: Y coordinate, fingerID: finger id (1-10)")
            .returns("none")
            .example("motion.Click(100, 200, 1)")
            .keywords("点击 触摸 click tap touch 坐标"),
        CapabilityDoc::new("motion", "LongClick")
            .description("Long-press the screen at the given coordinate")
            .signature("func LongClick(x, y, duration int)")
            .parameters("x: X coordinate, y: Y coordinate, duration: press duration (ms)")
            .returns("none")
            .example("motion.LongClick(100, 200, 500)")
            .keywords("长按 long press 按住"),
        CapabilityDoc::new("motion", "Swipe")
            .description("Swipe from one coordinate to another")
            .signature("func Swipe(x1, y1, x2, y2, duration int)")
            .parameters("x1,y1: start coordinate, x2,y2: end coordinate, duration: swipe duration (ms)")
            .returns("none")
            .example("motion.Swipe(100, 200, 300, 400, 500)")
            .keywords("滑动 swipe 拖拽 drag"),
        CapabilityDoc::new("motion", "Back")
            .description("Press the back key")
            .signature("func Back()")
            .parameters("none")
            .returns("none")
            .example("motion.Back()")
            .keywords("返回 back 后退"),
        CapabilityDoc::new("motion", "Home")
            .description("Press the home key")
            .signature("func Home()")
            .parameters("none")
            .returns("none")
            .example("motion.Home()")
            .keywords("主页 home 首页"),
        // ── uiacc ──
        CapabilityDoc::new("uiacc", "New")
            .description("Create a UI control selector")
            .signature("func New() *Uiacc")
            .parameters("none")
            .returns("*Uiacc: selector")
            .example("uiacc.New()")
            .keywords("选择器 selector ui 控件"),
        CapabilityDoc::new("uiacc", "Text")
            .description("Match controls by their text")
            .signature("func (a *Uiacc) Text(value string) *Uiacc")
            .parameters("value: text to match")
            .returns("*Uiacc: the selector, for chaining")
            .example("uiacc.New().Text(\"登录\")")
            .keywords("文本 text 文字 查找"),
        CapabilityDoc::new("uiacc", "FindOnce")
            .description("Find a single control matching the selector")
            .signature("func (a *Uiacc) FindOnce() *UiObject")
            .parameters("none")
            .returns("*UiObject: the control, nil when not found")
            .example("uiacc.New().Text(\"确定\").FindOnce()")
            .keywords("查找 find 搜索 定位"),
        CapabilityDoc::new("uiacc", "WaitFor")
            .description("Wait until a control matching the selector appears")
            .signature("func (a *Uiacc) WaitFor(timeout int) *UiObject")
            .parameters("timeout: timeout in ms, 0 waits forever")
            .returns("*UiObject: the control, nil on timeout")
            .example("uiacc.New().Id(\"button1\").WaitFor(5000)")
            .keywords("等待 wait 超时 timeout"),
        CapabilityDoc::new("uiacc", "Click")
            .description("Click a UI control")
            .signature("func (u *UiObject) Click() bool")
            .parameters("none")
            .returns("bool: whether the click succeeded")
            .example("uiacc.New().Text(\"确定\").FindOnce().Click()")
            .keywords("点击 click 控件点击"),
        CapabilityDoc::new("uiacc", "SetText")
            .description("Set the text of an input control")
            .signature("func (u *UiObject) SetText(str string) bool")
            .parameters("str: text to enter")
            .returns("bool: whether the text was set")
            .example("uiacc.New().Editable(true).FindOnce().SetText(\"Hello\")")
            .keywords("输入 input 文本 text 设置"),
        // ── opencv ──
        CapabilityDoc::new("opencv", "FindImage")
            .description("Find an image template on the screen")
            .signature(
                "func FindImage(x1, y1, x2, y2 int, template *[]byte, isGray bool, scalingFactor, sim float32) (int, int)",
            )
            .parameters(
                "x1,y1: search area top-left, x2,y2: search area bottom-right, template: template bytes, isGray: grayscale match, scalingFactor: scale, sim: similarity threshold",
            )
            .returns("(int, int): match coordinate, (-1, -1) when not found")
            .example("x, y := opencv.FindImage(0, 0, 0, 0, &templateBytes, false, 1.0, 0.8)")
            .keywords("图像 图片 模板 匹配 find image template"),
        // ── ppocr ──
        CapabilityDoc::new("ppocr", "Ocr")
            .description("Recognize text in a screen region")
            .signature("func Ocr(x1, y1, x2, y2 int, colorStr string) []Result")
            .parameters("x1,y1: region top-left, x2,y2: region bottom-right, colorStr: color filter")
            .returns("[]Result: recognition results")
            .example("results := ppocr.Ocr(0, 0, 1080, 1920, \"\")")
            .keywords("OCR 文字识别 识别文字 文本识别"),
        CapabilityDoc::new("ppocr", "OcrFromImage")
            .description("Recognize text in an image")
            .signature("func OcrFromImage(img *image.NRGBA, colorStr string) []Result")
            .parameters("img: image, colorStr: color filter")
            .returns("[]Result: recognition results")
            .example("results := ppocr.OcrFromImage(img, \"\")")
            .keywords("OCR 图像识别"),
        // ── images ──
        CapabilityDoc::new("images", "CaptureScreen")
            .description("Capture a region of the screen")
            .signature("func CaptureScreen(x1, y1, x2, y2 int) *image.NRGBA")
            .parameters("x1,y1: region top-left, x2,y2: region bottom-right, all 0 for full screen")
            .returns("*image.NRGBA: the captured image")
            .example("img := images.CaptureScreen(0, 0, 0, 0)")
            .keywords("截图 屏幕 capture screen"),
        // ── app ──
        CapabilityDoc::new("app", "Launch")
            .description("Launch an application")
            .signature("func Launch(packageName string, displayId int) bool")
            .parameters("packageName: application package, displayId: display id")
            .returns("bool: whether the launch succeeded")
            .example("app.Launch(\"com.example.app\", 0)")
            .keywords("启动 launch 打开 open app"),
        CapabilityDoc::new("app", "CurrentPackage")
            .description("Get the package name of the foreground application")
            .signature("func CurrentPackage() string")
            .parameters("none")
            .returns("string: package name")
            .example("pkg := app.CurrentPackage()")
            .keywords("包名 package 当前应用"),
        CapabilityDoc::new("app", "ForceStop")
            .description("Force-stop an application")
            .signature("func ForceStop(packageName string)")
            .parameters("packageName: application package")
            .returns("none")
            .example("app.ForceStop(\"com.example.app\")")
            .keywords("停止 stop 关闭"),
        // ── ime ──
        CapabilityDoc::new("ime", "InputText")
            .description("Type text through the input method")
            .signature("func InputText(text string)")
            .parameters("text: text to type")
            .returns("none")
            .example("ime.InputText(\"Hello World\")")
            .keywords("输入 input text 文本"),
        CapabilityDoc::new("ime", "SetClipText")
            .description("Set the clipboard text")
            .signature("func SetClipText(text string) bool")
            .parameters("text: clipboard content")
            .returns("bool: whether it succeeded")
            .example("ime.SetClipText(\"Hello\")")
            .keywords("剪切板 clipboard"),
        // ── utils ──
        CapabilityDoc::new("utils", "Sleep")
            .description("Sleep for the given duration")
            .signature("func Sleep(i int)")
            .parameters("i: duration (ms)")
            .returns("none")
            .example("utils.Sleep(1000)")
            .keywords("等待 sleep 延时 delay"),
    ]
}
