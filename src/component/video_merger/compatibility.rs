use crate::tools::MediaDescriptor;

/// 判斷所有輸入是否一致到可以走串流複製
///
/// codec、解析度、幀率都要跟第一個輸入相同；空集合或單一輸入視為一致。
/// 任何模糊狀況（幀率分母為 0 等）一律回傳不一致，寧可多花時間重新編碼
/// 也不要產出壞檔。
#[must_use]
pub fn is_uniform(descriptors: &[MediaDescriptor], fps_epsilon: f64) -> bool {
    let Some(first) = descriptors.first() else {
        return true;
    };

    descriptors.iter().skip(1).all(|desc| {
        desc.codec_id == first.codec_id
            && (desc.width, desc.height) == (first.width, first.height)
            && frame_rates_match(first, desc, fps_epsilon)
    })
}

/// 幀率比較：先約分成最簡分數，不相等時再用浮點比值加容差判斷
///
/// 這樣 30/1 與 30000/1000 視為相同，30/1 與 30000/1001 視為不同
fn frame_rates_match(a: &MediaDescriptor, b: &MediaDescriptor, epsilon: f64) -> bool {
    if a.fps_den == 0 || b.fps_den == 0 {
        return false;
    }

    if reduce(a.fps_num, a.fps_den) == reduce(b.fps_num, b.fps_den) {
        return true;
    }

    (a.frame_rate() - b.frame_rate()).abs() < epsilon
}

fn reduce(num: u32, den: u32) -> (u32, u32) {
    let divisor = gcd(num, den);
    (num / divisor, den / divisor)
}

fn gcd(mut a: u32, mut b: u32) -> u32 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}
